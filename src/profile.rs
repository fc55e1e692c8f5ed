//! Alignment between two alignments, each summarised as a column profile.
//!
//! The reference codon of a profile is a mixture of up to 64 codons. Evaluating all of them
//! is too costly, so the emission is approximated by the most frequent codon and the
//! three codons one step away from it, each swapping one position to its second most frequent
//! nucleotide. Columns tied at the top keep all of their tied nucleotides.
use crate::alphabet::{self, ADENINE, CYTOSINE, GAP, GUANINE, THYMINE};
use crate::config::{GapCosts, GapModel};
use crate::error::{AlignError, Result};
use crate::gotoh::{self, Emission};
use crate::marginal::MarginalModel;
use crate::Alignment;
use serde::{Deserialize, Serialize};

/// Nucleotide frequencies (A, C, G, T) of each column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    columns: Vec<[f64; 4]>,
}

impl Profile {
    /// Each row adds `1/rows` to its nucleotide. Gaps add nothing, `N` adds a quarter to each.
    pub fn from_sequences<T: AsRef<[u8]>>(rows: &[T]) -> Result<Self> {
        let len = match rows.first() {
            Some(row) => row.as_ref().len(),
            None => return Err(AlignError::EmptyProfile),
        };
        if let Some(row) = rows.iter().find(|row| row.as_ref().len() != len) {
            let found = row.as_ref().len();
            return Err(AlignError::RaggedProfile { expected: len, found });
        }
        let unit = (rows.len() as f64).recip();
        let mut columns = vec![[0f64; 4]; len];
        for row in rows.iter() {
            for (column, &base) in columns.iter_mut().zip(row.as_ref()) {
                match alphabet::encode(base) {
                    x @ (ADENINE | CYTOSINE | GUANINE | THYMINE) => column[x as usize] += unit,
                    GAP => {}
                    _ => column.iter_mut().for_each(|x| *x += unit / 4f64),
                }
            }
        }
        Ok(Self { columns })
    }
    pub fn len(&self) -> usize {
        self.columns.len()
    }
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
    pub fn columns(&self) -> &[[f64; 4]] {
        &self.columns
    }
}

/// Background probability of a column, `sum_n column[n] * freqs[n]`.
pub fn weighted_background(column: &[f64; 4], freqs: &[f64; 4]) -> f64 {
    column
        .iter()
        .zip(freqs.iter())
        .filter(|&(&x, _)| x != 0f64)
        .map(|(x, f)| x * f)
        .sum()
}

// A column without any nucleotide is as uninformative as N.
fn or_uniform(column: &[f64; 4]) -> [f64; 4] {
    match column.iter().all(|&x| x == 0f64) {
        true => [0.25; 4],
        false => *column,
    }
}

// Index and value of the maximum, the first one on ties.
fn argmax(xs: &[f64; 4]) -> (usize, f64) {
    xs.iter()
        .enumerate()
        .fold((0, xs[0]), |(i, x), (j, &y)| if x < y { (j, y) } else { (i, x) })
}

// Every combination of one nucleotide per position, weighted by the product of frequencies.
fn combine(sets: [&[(usize, f64)]; 3], codons: &mut Vec<(usize, f64)>) {
    for &(x, wx) in sets[0] {
        for &(y, wy) in sets[1] {
            for &(z, wz) in sets[2] {
                let codon = alphabet::codon_index(x as u8, y as u8, z as u8);
                codons.push((codon, wx * wy * wz));
            }
        }
    }
}

/// The top codon and its three neighbors with their weights, from three profile columns.
/// When nucleotides tie at the top of a column, every one of them is taken as the top
/// and the column has no neighbor, so a uniform column mixes all four nucleotides evenly.
pub fn top_codons(block: &[[f64; 4]]) -> Vec<(usize, f64)> {
    assert_eq!(block.len(), 3);
    let mut tops: Vec<Vec<(usize, f64)>> = Vec::with_capacity(3);
    let mut seconds: Vec<Option<(usize, f64)>> = Vec::with_capacity(3);
    for column in block.iter() {
        let mut column = or_uniform(column);
        let (top, max) = argmax(&column);
        let tied: Vec<_> = (0..4)
            .filter(|&n| column[n] == max)
            .map(|n| (n, max))
            .collect();
        let second = match tied.len() {
            1 => {
                column[top] = -1f64;
                Some(argmax(&column))
            }
            _ => None,
        };
        tops.push(tied);
        seconds.push(second);
    }
    let mut codons = Vec::with_capacity(4);
    combine(
        [tops[0].as_slice(), tops[1].as_slice(), tops[2].as_slice()],
        &mut codons,
    );
    for (pos, second) in seconds.iter().enumerate() {
        if let Some(second) = second {
            let second = [*second];
            let mut sets = [tops[0].as_slice(), tops[1].as_slice(), tops[2].as_slice()];
            sets[pos] = &second[..];
            combine(sets, &mut codons);
        }
    }
    codons
}

/// Probability to emit the `query` column at `pos` of the reference codon block.
pub fn codon_emission(
    codons: &[(usize, f64)],
    pos: usize,
    query: &[f64; 4],
    model: &MarginalModel,
) -> f64 {
    let query = or_uniform(query);
    codons
        .iter()
        .map(|&(codon, weight)| {
            let emission: f64 = (0..4).map(|n| query[n] * model.get(codon, pos, n)).sum();
            weight * emission
        })
        .sum()
}

#[derive(Debug, Clone)]
struct ProfileEmission<'a> {
    reference: Vec<Vec<(usize, f64)>>,
    query: &'a Profile,
    model: &'a MarginalModel,
    freqs: [f64; 4],
}

impl<'a> ProfileEmission<'a> {
    fn new(
        reference: &Profile,
        query: &'a Profile,
        model: &'a MarginalModel,
        costs: &GapCosts,
    ) -> Self {
        let reference = reference.columns.chunks_exact(3).map(top_codons).collect();
        Self {
            reference,
            query,
            model,
            freqs: *costs.background_freqs(),
        }
    }
}

impl<'a> Emission for ProfileEmission<'a> {
    fn reference_len(&self) -> usize {
        3 * self.reference.len()
    }
    fn query_len(&self) -> usize {
        self.query.len()
    }
    fn match_cost(&self, i: usize, j: usize) -> f64 {
        let (codon, pos) = ((i - 1) / 3, (i - 1) % 3);
        let query = &self.query.columns[j - 1];
        -codon_emission(&self.reference[codon], pos, query, self.model).ln()
    }
    fn insert_cost(&self, j: usize) -> f64 {
        let column = or_uniform(&self.query.columns[j - 1]);
        -weighted_background(&column, &self.freqs).ln()
    }
}

/// Align two alignments. The output has the rows of `reference` followed by those of `query`.
pub fn align_profiles<T, U>(
    reference: &[T],
    query: &[U],
    model: &MarginalModel,
    gap: &GapModel,
) -> Result<Alignment>
where
    T: AsRef<[u8]>,
    U: AsRef<[u8]>,
{
    let ref_profile = Profile::from_sequences(reference)?;
    let query_profile = Profile::from_sequences(query)?;
    if ref_profile.len() % 3 != 0 {
        return Err(AlignError::ReferenceFrame(ref_profile.len()));
    }
    debug!("PROFILE\t{}\t{}", reference.len(), query.len());
    let costs = gap.costs();
    let emission = ProfileEmission::new(&ref_profile, &query_profile, model, &costs);
    let (weight, ops) = gotoh::align_by(&emission, &costs, 1);
    let seqs = crate::op::recover(reference, query, &ops);
    debug!("WEIGHT\t{:.5}", weight);
    Ok(Alignment { seqs, weight })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codon::DEFAULT_BRANCH_LENGTH;
    use crate::gen_seq;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    // [base][pos] as printed, transposed into columns.
    fn block(rows: [[f64; 3]; 4]) -> Vec<[f64; 4]> {
        (0..3)
            .map(|pos| [rows[0][pos], rows[1][pos], rows[2][pos], rows[3][pos]])
            .collect()
    }
    #[test]
    fn create_profile() {
        let aln = ["CTCTGGATAGTG", "CT----ATAGTG", "CTCT---TAGTG", "CTCTG--TAGTG"];
        let profile = Profile::from_sequences(&aln).unwrap();
        let answer = [
            [0., 0., 0., 0., 0., 0., 0.5, 0., 1., 0., 0., 0.],
            [1., 0., 0.75, 0., 0., 0., 0., 0., 0., 0., 0., 0.],
            [0., 0., 0., 0., 0.5, 0.25, 0., 0., 0., 1., 0., 1.],
            [0., 1., 0., 0.75, 0., 0., 0., 1., 0., 0., 1., 0.],
        ];
        assert_eq!(profile.len(), 12);
        for (j, column) in profile.columns().iter().enumerate() {
            for base in 0..4 {
                assert_eq!(column[base], answer[base][j], "{},{}", base, j);
            }
        }
        let profile = Profile::from_sequences(&["ACGN"]).unwrap();
        assert_eq!(profile.columns()[3], [0.25; 4]);
        assert_eq!(profile.columns()[2], [0., 0., 1., 0.]);
    }
    #[test]
    fn malformed_profile() {
        let empty: Vec<Vec<u8>> = vec![];
        assert!(matches!(
            Profile::from_sequences(&empty),
            Err(AlignError::EmptyProfile)
        ));
        assert!(matches!(
            Profile::from_sequences(&["ACG", "AC"]),
            Err(AlignError::RaggedProfile {
                expected: 3,
                found: 2
            })
        ));
        let model = MarginalModel::mg94(DEFAULT_BRANCH_LENGTH);
        let gap = GapModel::default();
        assert!(matches!(
            align_profiles(&["ACGT"], &["ACG"], &model, &gap),
            Err(AlignError::ReferenceFrame(4))
        ));
        assert!(align_profiles(&["ACG"], &empty, &model, &gap).is_err());
    }
    #[test]
    fn background() {
        let freqs = [0.3, 0.2, 0.2, 0.3];
        assert_eq!(weighted_background(&[1., 0., 0., 0.], &freqs), 0.3);
        assert_eq!(weighted_background(&[0.25; 4], &freqs), 0.25);
        assert_eq!(weighted_background(&[0.5, 0.1, 0.2, 0.2], &freqs), 0.27);
    }
    #[test]
    fn top2_emission() {
        let model = MarginalModel::mg94(DEFAULT_BRANCH_LENGTH);
        let approx = |x: f64, y: f64| (x - y).abs() < 1e-5;
        let aaa = top_codons(&block([[1., 1., 1.], [0.; 3], [0.; 3], [0.; 3]]));
        assert_eq!(aaa[0], (0, 1f64));
        let query = [1f64, 0., 0., 0.];
        assert!(approx(codon_emission(&aaa, 2, &query, &model), 0.99352));
        assert!(approx(codon_emission(&aaa, 0, &query, &model), 0.99831));
        let query = [0f64, 0., 1., 0.];
        assert!(approx(codon_emission(&aaa, 2, &query, &model), 0.00599));
        assert!(approx(codon_emission(&aaa, 1, &query, &model), 0.00121));
        let aca = top_codons(&block([
            [0.4, 0.2, 0.4],
            [0.3, 0.4, 0.1],
            [0.2, 0.3, 0.2],
            [0.1, 0.1, 0.3],
        ]));
        for pos in 0..3 {
            let emission = codon_emission(&aca, pos, &[0.25; 4], &model);
            assert!(approx(emission, 0.052), "{}", emission);
        }
        let cgt = top_codons(&block([
            [0.3, 0.2, 0.3],
            [0.4, 0.2, 0.1],
            [0.2, 0.5, 0.2],
            [0.1, 0.1, 0.4],
        ]));
        let query = [0.3, 0.2, 0.2, 0.3];
        assert_eq!(cgt.len(), 4);
        assert!(approx(codon_emission(&cgt, 2, &query, &model), 0.06945));
        assert!(approx(codon_emission(&cgt, 0, &query, &model), 0.05244));
        assert!(approx(codon_emission(&cgt, 1, &query, &model), 0.04964));
        // Tied columns mix every tied nucleotide, as N does in the pairwise aligner.
        let nnn = top_codons(&block([[0.25; 3]; 4]));
        assert_eq!(nnn.len(), 64);
        assert!(approx(nnn.iter().map(|x| x.1).sum(), 1f64));
        let aan = top_codons(&block([
            [1., 1., 0.25],
            [0., 0., 0.25],
            [0., 0., 0.25],
            [0., 0., 0.25],
        ]));
        let query = [0f64, 1., 0., 0.];
        for pos in 0..3 {
            let profile = codon_emission(&nnn, pos, &query, &model);
            assert!((profile - model.emission(b"NNN", pos, b'C')).abs() < 1e-12);
            let profile = codon_emission(&aan, pos, &query, &model);
            assert!((profile - model.emission(b"AAN", pos, b'C')).abs() < 1e-12);
        }
        let tied = top_codons(&block([[0.5, 1., 1.], [0.5, 0., 0.], [0.; 3], [0.; 3]]));
        let codons: Vec<_> = tied.iter().map(|x| x.0).collect();
        assert_eq!(codons, vec![0, 16, 4, 20, 1, 17]);
    }
    #[test]
    fn single_row_profiles() {
        let model = MarginalModel::mg94(DEFAULT_BRANCH_LENGTH);
        let gap = GapModel::default();
        let aln = align_profiles(&["CTCTGG"], &["CCTGG"], &model, &gap).unwrap();
        assert_eq!(aln.seqs, vec![b"CTCTGG".to_vec(), b"C-CTGG".to_vec()]);
        assert!((aln.weight - 8.73227).abs() < 1e-5);
        let pair = gotoh::align(b"CTCTGG", b"CCTGG", &model, &gap).unwrap();
        assert_eq!(aln.seqs, pair.seqs);
        assert!((aln.weight - pair.weight).abs() < 1e-9);
        let ambiguous: [(&[u8], &[u8]); 4] = [
            (b"AANCCC", b"AAACCC"),
            (b"NNN", b"ACG"),
            (b"ATGNCCAAATTT", b"ATGAANTTT"),
            (b"ANGCCN", b"NCGCC"),
        ];
        for &(xs, ys) in ambiguous.iter() {
            let aln = align_profiles(&[xs], &[ys], &model, &gap).unwrap();
            let pair = gotoh::align(xs, ys, &model, &gap).unwrap();
            assert_eq!(aln.seqs, pair.seqs);
            assert!((aln.weight - pair.weight).abs() < 1e-9, "{}\n{}", aln, pair);
        }
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(3290);
        for _ in 0..20 {
            let xs = gen_seq::generate_coding_seq(&mut rng, 15);
            let xs = gen_seq::introduce_ambiguity(&xs, &mut rng, 0.05);
            let ys = gen_seq::introduce_randomness(&xs, &mut rng, &gen_seq::PROFILE);
            let ys = gen_seq::introduce_ambiguity(&ys, &mut rng, 0.05);
            let aln = align_profiles(&[&xs], &[&ys], &model, &gap).unwrap();
            let pair = gotoh::align(&xs, &ys, &model, &gap).unwrap();
            assert_eq!(aln.seqs, pair.seqs);
            assert!((aln.weight - pair.weight).abs() < 1e-9);
        }
    }
    #[test]
    fn merge_rosters() {
        let model = MarginalModel::mg94(DEFAULT_BRANCH_LENGTH);
        let gap = GapModel::default();
        let xs = ["CTCTGGATAGTG", "CT----ATAGTG"];
        let ys = ["CTCTGGATAGTG", "CTCT---TAGTG", "CTCTG--TAGTG"];
        let aln = align_profiles(&xs, &ys, &model, &gap).unwrap();
        assert_eq!(aln.seqs.len(), 5);
        let len = aln.seqs[0].len();
        assert!(aln.seqs.iter().all(|row| row.len() == len));
        let strip = |row: &[u8]| -> Vec<u8> {
            row.iter().filter(|&&x| x != b'-').copied().collect()
        };
        let inputs = xs.iter().chain(ys.iter());
        for (row, input) in aln.seqs.iter().zip(inputs) {
            assert_eq!(strip(row), strip(input.as_bytes()));
        }
        assert!(12 <= len);
        assert!(aln.weight.is_finite());
    }
}
