//! Per-nucleotide marginals of a codon transition matrix.
//!
//! `p[c][pos][n]` is the probability that the `pos`-th nucleotide of the descendant of codon `c`
//! is `n`, regardless of the other two positions.
use crate::alphabet::{self, ANY};
use crate::codon::{CodonMatrix, NUM_CODONS};

/// Emission costs of a reference codon, `[pos][query base]` in `-ln` scale.
/// The last slot of each position is for `N`.
pub type CodonCosts = [[f64; 5]; 3];

#[derive(Debug, Clone, PartialEq)]
pub struct MarginalModel {
    // [codon][pos]
    table: Vec<[[f64; 4]; 3]>,
}

impl MarginalModel {
    pub fn new(matrix: &CodonMatrix) -> Self {
        let mut table = vec![[[0f64; 4]; 3]; NUM_CODONS];
        for (from, slots) in table.iter_mut().enumerate() {
            for (to, &prob) in matrix.row(from).iter().enumerate() {
                for (pos, slot) in slots.iter_mut().enumerate() {
                    slot[alphabet::codon_base(to, pos) as usize] += prob;
                }
            }
            for slot in slots.iter_mut() {
                let sum: f64 = slot.iter().sum();
                if 0f64 < sum {
                    slot.iter_mut().for_each(|x| *x /= sum);
                }
            }
        }
        Self { table }
    }
    /// Marginals of the MG94 model after `branch_length`.
    pub fn mg94(branch_length: f64) -> Self {
        Self::new(&CodonMatrix::mg94(branch_length))
    }
    /// `p[codon][pos][base]` for a concrete codon index.
    pub fn get(&self, codon: usize, pos: usize, base: usize) -> f64 {
        self.table[codon][pos][base]
    }
    // Both codon and base are nucleotide codes, possibly ANY.
    fn emission_code(&self, codon: [u8; 3], pos: usize, base: u8) -> f64 {
        if codon.iter().any(|&x| x == ANY) {
            let matches = |c: usize| {
                (0..3).all(|p| codon[p] == ANY || codon[p] == alphabet::codon_base(c, p))
            };
            let expansions: Vec<_> = (0..NUM_CODONS).filter(|&c| matches(c)).collect();
            let sum: f64 = expansions
                .iter()
                .map(|&c| self.concrete_emission(c, pos, base))
                .sum();
            sum / expansions.len() as f64
        } else {
            let codon = alphabet::codon_index(codon[0], codon[1], codon[2]);
            self.concrete_emission(codon, pos, base)
        }
    }
    fn concrete_emission(&self, codon: usize, pos: usize, base: u8) -> f64 {
        let slot = &self.table[codon][pos];
        match base {
            ANY => slot.iter().sum::<f64>() / 4f64,
            _ => slot[base as usize],
        }
    }
    /// Probability to emit `base` at `pos` (0, 1, or 2) from `codon`.
    /// Both are raw bytes. `N` in the query is the mean over the four nucleotides,
    /// `N` in the codon is the mean over every codon it could be.
    pub fn emission(&self, codon: &[u8; 3], pos: usize, base: u8) -> f64 {
        let code = |x: u8| alphabet::encode(x).min(ANY);
        let codon = [code(codon[0]), code(codon[1]), code(codon[2])];
        self.emission_code(codon, pos, code(base))
    }
    /// `-ln` of every emission of the reference codon given as nucleotide codes.
    pub fn codon_costs(&self, codon: [u8; 3]) -> CodonCosts {
        let mut costs = [[0f64; 5]; 3];
        for (pos, slots) in costs.iter_mut().enumerate() {
            for (base, slot) in slots.iter_mut().enumerate() {
                *slot = -self.emission_code(codon, pos, base as u8).ln();
            }
        }
        costs
    }
}
