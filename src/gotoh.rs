//! Three-state affine gap DP minimising the negative log-likelihood.
//!
//! The reference is read codon by codon, the query nucleotide by nucleotide.
//! A gap consumes `step` nucleotides at once: 1 for the marginal aligner,
//! 3 for the frame-preserving one. The same recurrence serves both, and the profile
//! aligner swaps in its own emission through the `Emission` trait.
use crate::alphabet::{self, ANY, GAP_SYMBOL};
use crate::config::{AlignConfig, GapCosts, GapModel, Mode};
use crate::dptable::GotohTable;
use crate::error::{AlignError, Result};
use crate::marginal::{CodonCosts, MarginalModel};
use crate::op::{Op, State, Trace};
use crate::Alignment;

/// Emission costs of a pair of operands. Indices are 1-origin, as the DP's.
pub trait Emission {
    fn reference_len(&self) -> usize;
    fn query_len(&self) -> usize;
    /// `-ln` probability to align the i-th reference column to the j-th query column.
    fn match_cost(&self, i: usize, j: usize) -> f64;
    /// `-ln` probability to emit the j-th query column from the background.
    fn insert_cost(&self, j: usize) -> f64;
}

/// Emission between two raw sequences.
#[derive(Debug, Clone)]
pub struct SequenceEmission {
    // Costs of each reference codon.
    reference: Vec<CodonCosts>,
    // Nucleotide codes of the query.
    query: Vec<u8>,
    costs: GapCosts,
}

impl SequenceEmission {
    /// The length of the reference should be a multiple of 3.
    pub fn new(
        reference: &[u8],
        query: &[u8],
        model: &MarginalModel,
        costs: &GapCosts,
    ) -> Result<Self> {
        if reference.len() % 3 != 0 {
            return Err(AlignError::ReferenceFrame(reference.len()));
        }
        let code = |&x: &u8| alphabet::encode(x).min(ANY);
        let reference = reference
            .chunks_exact(3)
            .map(|codon| model.codon_costs([code(&codon[0]), code(&codon[1]), code(&codon[2])]))
            .collect();
        let query = query.iter().map(code).collect();
        Ok(Self {
            reference,
            query,
            costs: *costs,
        })
    }
}

impl Emission for SequenceEmission {
    fn reference_len(&self) -> usize {
        3 * self.reference.len()
    }
    fn query_len(&self) -> usize {
        self.query.len()
    }
    fn match_cost(&self, i: usize, j: usize) -> f64 {
        let (codon, pos) = ((i - 1) / 3, (i - 1) % 3);
        self.reference[codon][pos][self.query[j - 1] as usize]
    }
    fn insert_cost(&self, j: usize) -> f64 {
        self.costs.background(self.query[j - 1])
    }
}

/// Fill the DP tables. Gaps consume `step` columns at once, and when `step` is
/// more than one, only the cells with `i = j (mod step)` are filled.
pub fn fill<E: Emission>(emission: &E, costs: &GapCosts, step: usize) -> GotohTable {
    assert!(0 < step);
    let (m, n) = (emission.reference_len(), emission.query_len());
    let mut table = GotohTable::new(m + 1, n + 1);
    let gap_body = (step - 1) as f64 * costs.extend;
    let gap_extend = step as f64 * costs.extend;
    let ins_open = costs.open + gap_body + costs.close;
    let del_open = costs.no_open + costs.open + gap_body + costs.close;
    let del_after_ins = costs.close + costs.open + gap_body;
    // Background emission of the `step` query columns ending at j.
    let ins_emission: Vec<f64> = (0..=n)
        .map(|j| match step <= j {
            true => (j + 1 - step..=j).map(|j| emission.insert_cost(j)).sum(),
            false => f64::INFINITY,
        })
        .collect();
    for i in 0..=m {
        for j in (0..=n).filter(|&j| i % step == j % step) {
            if i == 0 && j == 0 {
                continue;
            }
            if step <= j {
                let prev = j - step;
                let bg = ins_emission[j];
                let open = match table.state(i, prev) {
                    Some(State::Match) => table.best.get(i, prev) + ins_open + bg,
                    Some(State::Insert) => table.best.get(i, prev) + gap_extend + bg,
                    Some(State::Delete) | None => f64::INFINITY,
                };
                let extend = table.ins.get(i, prev) + gap_extend + bg;
                let (cost, trace) = match extend < open {
                    true => (extend, Trace::InsertExtend),
                    false => (open, Trace::InsertOpen),
                };
                if cost < f64::INFINITY {
                    table.ins.set(i, j, cost);
                    table.ins_trace.set(i, j, Some(trace));
                }
            }
            if step <= i {
                let prev = i - step;
                let open = match table.state(prev, j) {
                    Some(State::Match) => table.best.get(prev, j) + del_open,
                    Some(State::Insert) => table.best.get(prev, j) + del_after_ins,
                    Some(State::Delete) => table.best.get(prev, j) + gap_extend,
                    None => f64::INFINITY,
                };
                let extend = table.del.get(prev, j) + gap_extend;
                let (cost, trace) = match extend < open {
                    true => (extend, Trace::DeleteExtend),
                    false => (open, Trace::DeleteOpen),
                };
                if cost < f64::INFINITY {
                    table.del.set(i, j, cost);
                    table.del_trace.set(i, j, Some(trace));
                }
            }
            let (mut best, mut best_trace) = (f64::INFINITY, None);
            if 0 < i && 0 < j {
                let transition = match table.state(i - 1, j - 1) {
                    Some(State::Match) => 2f64 * costs.no_open,
                    Some(State::Insert) => costs.no_open,
                    Some(State::Delete) => 0f64,
                    None => f64::INFINITY,
                };
                let diag = table.best.get(i - 1, j - 1) + transition + emission.match_cost(i, j);
                if diag < best {
                    best = diag;
                    best_trace = Some(Trace::Match);
                }
            }
            if table.ins.get(i, j) < best {
                best = table.ins.get(i, j);
                best_trace = table.ins_trace.get(i, j);
            }
            if table.del.get(i, j) < best {
                best = table.del.get(i, j);
                best_trace = table.del_trace.get(i, j);
            }
            if best_trace.is_some() {
                table.best.set(i, j, best);
                table.best_trace.set(i, j, best_trace);
            }
        }
    }
    table
}

/// Fill, then trace back from the last cell. Returns the weight and the operations.
pub fn align_by<E: Emission>(emission: &E, costs: &GapCosts, step: usize) -> (f64, Vec<Op>) {
    let (m, n) = (emission.reference_len(), emission.query_len());
    debug!("DP\t{}x{}\tstep {}", m + 1, n + 1, step);
    let table = fill(emission, costs, step);
    let weight = table.best.get(m, n);
    let ops = table.traceback(m, n, step);
    (weight, ops)
}

fn log_alignment(aln: &Alignment) {
    if log_enabled!(log::Level::Debug) {
        let gaps: Vec<_> = aln
            .seqs
            .iter()
            .map(|row| bytecount::count(row, GAP_SYMBOL))
            .collect();
        debug!("WEIGHT\t{:.5}\tGAPS\t{:?}", aln.weight, gaps);
    }
    for row in aln.seqs.iter() {
        trace!("{}", String::from_utf8_lossy(row));
    }
}

/// Align the query to the reference coding sequence. Gaps may have any length.
pub fn align(
    reference: &[u8],
    query: &[u8],
    model: &MarginalModel,
    gap: &GapModel,
) -> Result<Alignment> {
    let costs = gap.costs();
    let emission = SequenceEmission::new(reference, query, model, &costs)?;
    let (weight, ops) = align_by(&emission, &costs, 1);
    let seqs = crate::op::recover(&[reference], &[query], &ops);
    let aln = Alignment { seqs, weight };
    log_alignment(&aln);
    Ok(aln)
}

/// Align the query to the reference coding sequence with gaps of whole codons only.
/// Both lengths should be multiples of 3.
pub fn align_frame_preserving(
    reference: &[u8],
    query: &[u8],
    model: &MarginalModel,
    gap: &GapModel,
) -> Result<Alignment> {
    if reference.len() % 3 != 0 || query.len() % 3 != 0 {
        return Err(AlignError::OperandFrame(reference.len(), query.len()));
    }
    let costs = gap.costs();
    let emission = SequenceEmission::new(reference, query, model, &costs)?;
    let (weight, ops) = align_by(&emission, &costs, 3);
    let seqs = crate::op::recover(&[reference], &[query], &ops);
    let aln = Alignment { seqs, weight };
    log_alignment(&aln);
    Ok(aln)
}

/// Align by the mode of the configuration.
pub fn align_with(
    reference: &[u8],
    query: &[u8],
    model: &MarginalModel,
    config: &AlignConfig,
) -> Result<Alignment> {
    match config.mode {
        Mode::Marginal => align(reference, query, model, &config.gap),
        Mode::FramePreserving => align_frame_preserving(reference, query, model, &config.gap),
    }
}
