//! Codon substitution matrices.
//!
//! A `CodonMatrix` is a 64x64 row-major matrix, `[from * 64 + to]`. As a transition matrix,
//! each row should sum to 1, i.e., `get(from, to) = Pr{to | from}` after a fixed
//! evolutionary distance.
use crate::alphabet;
use crate::error::{AlignError, Result};
use std::io::BufRead;

pub const NUM_CODONS: usize = 64;

/// Nucleotide frequencies (A, C, G, T) of Yang (1994).
pub const NUCLEOTIDE_FREQS: [f64; 4] = [0.308, 0.185, 0.199, 0.308];

// Nucleotide rate matrix estimated by Yang (1994). [from][to].
const NUCLEOTIDE_RATES: [[f64; 4]; 4] = [
    [-0.818, 0.132, 0.586, 0.1],
    [0.221, -1.349, 0.231, 0.897],
    [0.909, 0.215, -1.322, 0.198],
    [0.1, 0.537, 0.128, -0.765],
];

/// Nonsynonymous/synonymous rate ratio.
pub const OMEGA: f64 = 0.2;

/// Branch length used when the caller does not specify one.
pub const DEFAULT_BRANCH_LENGTH: f64 = 0.0133;

// Taylor terms and the norm to scale down to before squaring back.
const TAYLOR_TERMS: usize = 17;
const SCALED_NORM: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct CodonMatrix {
    data: Vec<f64>,
}

impl CodonMatrix {
    pub fn zeros() -> Self {
        Self {
            data: vec![0f64; NUM_CODONS * NUM_CODONS],
        }
    }
    pub fn identity() -> Self {
        let mut matrix = Self::zeros();
        for c in 0..NUM_CODONS {
            matrix.set(c, c, 1f64);
        }
        matrix
    }
    pub fn get(&self, from: usize, to: usize) -> f64 {
        self.data[from * NUM_CODONS + to]
    }
    pub fn set(&mut self, from: usize, to: usize, val: f64) {
        self.data[from * NUM_CODONS + to] = val;
    }
    pub fn row(&self, from: usize) -> &[f64] {
        &self.data[from * NUM_CODONS..(from + 1) * NUM_CODONS]
    }
    fn scale(&mut self, by: f64) {
        self.data.iter_mut().for_each(|x| *x *= by);
    }
    fn mul(&self, other: &Self) -> Self {
        let mut result = Self::zeros();
        for i in 0..NUM_CODONS {
            let row = self.row(i);
            let slots = &mut result.data[i * NUM_CODONS..(i + 1) * NUM_CODONS];
            for (k, &x) in row.iter().enumerate().filter(|&(_, &x)| x != 0f64) {
                slots
                    .iter_mut()
                    .zip(other.row(k))
                    .for_each(|(slot, y)| *slot += x * y);
            }
        }
        result
    }
    // Maximum absolute row sum.
    fn norm(&self) -> f64 {
        self.data
            .chunks_exact(NUM_CODONS)
            .map(|row| row.iter().map(|x| x.abs()).sum::<f64>())
            .fold(0f64, f64::max)
    }
    /// Matrix exponential by scaling and squaring a truncated Taylor series.
    pub fn exp(&self) -> Self {
        let mut squarings = 0;
        let norm = self.norm();
        while SCALED_NORM < norm / 2f64.powi(squarings) {
            squarings += 1;
        }
        let mut scaled = self.clone();
        scaled.scale(2f64.powi(-squarings));
        let mut result = Self::identity();
        let mut term = Self::identity();
        for k in 1..=TAYLOR_TERMS {
            term = term.mul(&scaled);
            term.scale((k as f64).recip());
            result
                .data
                .iter_mut()
                .zip(term.data.iter())
                .for_each(|(x, y)| *x += y);
        }
        for _ in 0..squarings {
            result = result.mul(&result);
        }
        result
    }
    /// Transition matrix `exp(Q * t)` from a rate matrix `Q`.
    pub fn from_rate_matrix(rates: &Self, branch_length: f64) -> Self {
        let mut rates = rates.clone();
        rates.scale(branch_length);
        rates.exp()
    }
    /// Muse & Gaut (1994) codon transition matrix after `branch_length`.
    pub fn mg94(branch_length: f64) -> Self {
        Self::from_rate_matrix(&mg94_rate(), branch_length)
    }
    /// Parse a rate matrix from CSV and exponentiate it.
    /// The first line is the branch length, followed by exactly 4096 lines of `codon,codon,rate`.
    pub fn from_rate_csv<R: BufRead>(rdr: R) -> Result<Self> {
        let mut lines = rdr.lines();
        let branch_length: f64 = match lines.next() {
            Some(line) => parse_field(line?.trim(), "branch length")?,
            None => return Err(AlignError::RateMatrix("empty file".to_string())),
        };
        let mut rates = Self::zeros();
        let mut count = 0;
        for line in lines {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let mut fields = line.trim().split(',');
            let mut next_field = || {
                fields
                    .next()
                    .ok_or_else(|| AlignError::RateMatrix(format!("malformed line: {}", line)))
            };
            let from = parse_codon(next_field()?)?;
            let to = parse_codon(next_field()?)?;
            let rate: f64 = parse_field(next_field()?, "rate")?;
            rates.set(from, to, rate);
            count += 1;
        }
        if count != NUM_CODONS * NUM_CODONS {
            let msg = format!("expected 4096 entries, found {}", count);
            return Err(AlignError::RateMatrix(msg));
        }
        Ok(Self::from_rate_matrix(&rates, branch_length))
    }
}

fn parse_field(field: &str, what: &str) -> Result<f64> {
    field
        .trim()
        .parse()
        .map_err(|_| AlignError::RateMatrix(format!("invalid {}: {}", what, field)))
}

fn parse_codon(codon: &str) -> Result<usize> {
    let codes: Vec<_> = codon.trim().bytes().map(alphabet::encode).collect();
    match codes.as_slice() {
        &[x, y, z] if x < 4 && y < 4 && z < 4 => Ok(alphabet::codon_index(x, y, z)),
        _ => Err(AlignError::RateMatrix(format!("invalid codon: {}", codon))),
    }
}

/// Muse & Gaut (1994) codon rate matrix, normalised to one expected substitution per unit time.
pub fn mg94_rate() -> CodonMatrix {
    let mut rates = CodonMatrix::zeros();
    let mut expected_rate = 0f64;
    for from in 0..NUM_CODONS {
        let mut row_sum = 0f64;
        for to in (0..NUM_CODONS).filter(|&to| alphabet::codon_distance(from, to) == 1) {
            let pos = (0..3)
                .find(|&p| alphabet::codon_base(from, p) != alphabet::codon_base(to, p))
                .unwrap_or(0);
            let x = alphabet::codon_base(from, pos) as usize;
            let y = alphabet::codon_base(to, pos) as usize;
            let rate = match alphabet::is_synonymous(from, to) {
                true => NUCLEOTIDE_RATES[x][y],
                false => NUCLEOTIDE_RATES[x][y] * OMEGA,
            };
            rates.set(from, to, rate);
            row_sum += rate;
        }
        rates.set(from, from, -row_sum);
        let freq: f64 = (0..3)
            .map(|p| NUCLEOTIDE_FREQS[alphabet::codon_base(from, p) as usize])
            .product();
        expected_rate += row_sum * freq;
    }
    rates.scale(expected_rate.recip());
    rates
}
