//! Codon-aware pairwise and profile alignment of coding DNA.
//!
//! The reference is read codon by codon and each of its nucleotides emits the aligned query
//! nucleotide by the marginal of a codon substitution model. Insertions and deletions follow an
//! affine (geometric) gap model, and the maximum likelihood alignment is found by a three-state
//! Gotoh DP.
//!
//! ```no_run
//! use codalign::{align, GapModel, MarginalModel};
//! let model = MarginalModel::mg94(codalign::codon::DEFAULT_BRANCH_LENGTH);
//! let aln = align(b"CTCTGG", b"CCTGG", &model, &GapModel::default()).unwrap();
//! assert_eq!(aln.seqs[1], b"C-CTGG");
//! ```
#[macro_use]
extern crate log;
pub mod alphabet;
pub mod codon;
pub mod config;
pub mod dptable;
pub mod error;
pub mod fasta;
pub mod gen_seq;
pub mod gotoh;
pub mod marginal;
pub mod op;
pub mod profile;
pub mod score;
pub use codon::CodonMatrix;
pub use config::{AlignConfig, GapModel, Mode};
pub use error::{AlignError, Result};
pub use gotoh::{align, align_frame_preserving, align_with};
pub use marginal::MarginalModel;
pub use profile::align_profiles;
pub use score::alignment_score;
use serde::{Deserialize, Serialize};

/// Aligned rows and the negative log-likelihood of the alignment (lower is better).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub seqs: Vec<Vec<u8>>,
    pub weight: f64,
}

impl Alignment {
    /// The number of columns.
    pub fn len(&self) -> usize {
        self.seqs.first().map(|row| row.len()).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl std::fmt::Display for Alignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{:.5}", self.weight)?;
        let rows: Vec<_> = self.seqs.iter().map(|x| String::from_utf8_lossy(x)).collect();
        write!(f, "{}", rows.join("\n"))
    }
}

/// Align each (reference, query) pair independently, in parallel.
pub fn align_batch<T, U>(
    pairs: &[(T, U)],
    model: &MarginalModel,
    config: &AlignConfig,
) -> Vec<Result<Alignment>>
where
    T: AsRef<[u8]> + Sync,
    U: AsRef<[u8]> + Sync,
{
    use rayon::prelude::*;
    debug!("BATCH\t{}\t{}", pairs.len(), config.mode);
    pairs
        .par_iter()
        .map(|(xs, ys)| align_with(xs.as_ref(), ys.as_ref(), model, config))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256StarStar;
    #[test]
    fn batch() {
        let model = MarginalModel::mg94(codon::DEFAULT_BRANCH_LENGTH);
        let config = AlignConfig::default();
        let mut rng: Xoshiro256StarStar = SeedableRng::seed_from_u64(2390);
        let mut pairs: Vec<_> = (0..30)
            .map(|_| {
                let xs = gen_seq::generate_coding_seq(&mut rng, 10);
                let ys = gen_seq::introduce_randomness(&xs, &mut rng, &gen_seq::PROFILE);
                (xs, ys)
            })
            .collect();
        pairs.push((b"ACGT".to_vec(), b"ACG".to_vec()));
        let alns = align_batch(&pairs, &model, &config);
        assert_eq!(alns.len(), pairs.len());
        for ((xs, ys), aln) in pairs.iter().zip(alns.iter()).take(30) {
            let aln = aln.as_ref().unwrap();
            let single = align(xs, ys, &model, &config.gap).unwrap();
            assert_eq!(aln, &single);
        }
        assert!(matches!(alns[30], Err(AlignError::ReferenceFrame(4))));
    }
    #[test]
    fn display() {
        let aln = Alignment {
            seqs: vec![b"CTCTGG".to_vec(), b"C-CTGG".to_vec()],
            weight: 8.7322654,
        };
        assert_eq!(format!("{}", aln), "8.73227\nCTCTGG\nC-CTGG");
        assert_eq!(aln.len(), 6);
    }
}
