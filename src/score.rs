//! Weight of an existing pairwise alignment under the same model as the aligners.
use crate::alphabet::{self, ANY};
use crate::config::GapModel;
use crate::error::{AlignError, Result};
use crate::marginal::MarginalModel;
use crate::op::State;

/// Negative log-likelihood of the alignment. The first row is the reference.
/// Columns where both rows have a gap are skipped.
pub fn alignment_score<T: AsRef<[u8]>>(
    rows: &[T],
    model: &MarginalModel,
    gap: &GapModel,
) -> Result<f64> {
    let (reference, query) = match rows {
        [reference, query] => (reference.as_ref(), query.as_ref()),
        _ => return Err(AlignError::RowCount(rows.len())),
    };
    if reference.len() != query.len() {
        return Err(AlignError::RaggedAlignment {
            expected: reference.len(),
            found: query.len(),
        });
    }
    let code = |&x: &u8| alphabet::encode(x).min(ANY);
    let ungapped: Vec<u8> = reference
        .iter()
        .filter(|&&x| !alphabet::is_gap(x))
        .map(code)
        .collect();
    if ungapped.len() % 3 != 0 {
        return Err(AlignError::ReferenceFrame(ungapped.len()));
    }
    let codons: Vec<_> = ungapped
        .chunks_exact(3)
        .map(|c| model.codon_costs([c[0], c[1], c[2]]))
        .collect();
    let costs = gap.costs();
    let (mut weight, mut state, mut i) = (0f64, State::Match, 0);
    for (column, (&x, &y)) in reference.iter().zip(query.iter()).enumerate() {
        match (alphabet::is_gap(x), alphabet::is_gap(y)) {
            (true, true) => continue,
            (false, false) => {
                weight += match state {
                    State::Match => 2f64 * costs.no_open,
                    State::Insert => costs.no_open,
                    State::Delete => 0f64,
                };
                weight += codons[i / 3][i % 3][code(&y) as usize];
                state = State::Match;
                i += 1;
            }
            (true, false) => {
                weight += match state {
                    State::Match => costs.open + costs.close,
                    State::Insert => costs.extend,
                    State::Delete => return Err(AlignError::ForbiddenTransition(column)),
                };
                weight += costs.background(code(&y));
                state = State::Insert;
            }
            (false, true) => {
                weight += match state {
                    State::Match => costs.no_open + costs.open + costs.close,
                    State::Insert => costs.close + costs.open,
                    State::Delete => costs.extend,
                };
                state = State::Delete;
                i += 1;
            }
        }
    }
    Ok(weight)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codon::DEFAULT_BRANCH_LENGTH;
    fn score(rows: &[&[u8]]) -> Result<f64> {
        let model = MarginalModel::mg94(DEFAULT_BRANCH_LENGTH);
        alignment_score(rows, &model, &GapModel::default())
    }
    #[test]
    fn known_alignments() {
        let weight = score(&[b"CTCTGG", b"C-CTGG"]).unwrap();
        assert!((weight - 8.732265395426493).abs() < 1e-6, "{}", weight);
        let weight = score(&[b"AAATTTCCCGGG", b"AAA---CCCGGG"]).unwrap();
        assert!((weight - 9.129551380841761).abs() < 1e-6, "{}", weight);
        let weight = score(&[b"CTC---TGGATAGTG", b"CTCGGAT---TAGTG"]).unwrap();
        assert!((weight - 22.593812672361967).abs() < 1e-6, "{}", weight);
        let weight = score(&[b"---", b"ACG"]).unwrap();
        assert!((weight - 13.543663265968119).abs() < 1e-6, "{}", weight);
    }
    #[test]
    fn double_gaps_skipped() {
        let with = score(&[b"C-TCTGG", b"C--CTGG"]).unwrap();
        let without = score(&[b"CTCTGG", b"C-CTGG"]).unwrap();
        assert_eq!(with, without);
    }
    #[test]
    fn malformed() {
        assert!(matches!(
            score(&[b"ACG", b"ACG", b"ACG"]),
            Err(AlignError::RowCount(3))
        ));
        assert!(matches!(
            score(&[b"ACG", b"AC"]),
            Err(AlignError::RaggedAlignment {
                expected: 3,
                found: 2
            })
        ));
        assert!(matches!(
            score(&[b"ACTG", b"AC-G"]),
            Err(AlignError::ReferenceFrame(4))
        ));
        assert!(matches!(
            score(&[b"AC-G", b"A-TG"]),
            Err(AlignError::ForbiddenTransition(2))
        ));
        // Deletion right after an insertion is fine.
        assert!(score(&[b"A-CG", b"AT-G"]).is_ok());
    }
}
