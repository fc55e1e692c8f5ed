//! This module is to generate some random coding sequences to assess the performance.
//! Usually, it would not be used in the real-applications.
use crate::alphabet::GENETIC_CODE;
use rand::seq::SliceRandom;
use rand::Rng;

#[derive(Debug, Clone, Copy)]
pub struct Profile {
    pub sub: f64,
    pub del: f64,
    pub ins: f64,
}
impl Profile {
    pub fn sum(&self) -> f64 {
        self.sub + self.del + self.ins
    }
    pub fn norm(&self) -> Self {
        let sum = self.sum();
        Self {
            sub: self.sub / sum,
            del: self.del / sum,
            ins: self.ins / sum,
        }
    }
    pub fn mul(&self, x: f64) -> Self {
        Self {
            sub: self.sub * x,
            ins: self.ins * x,
            del: self.del * x,
        }
    }
}

pub const PROFILE: Profile = Profile {
    sub: 0.04,
    del: 0.04,
    ins: 0.07,
};

#[derive(Debug, Clone, Copy)]
enum Op {
    Match,
    MisMatch,
    Del,
    In,
}
impl Op {
    fn weight(self, p: &Profile) -> f64 {
        match self {
            Op::Match => 1. - p.sub - p.del - p.ins,
            Op::MisMatch => p.sub,
            Op::Del => p.del,
            Op::In => p.ins,
        }
    }
}
const OPERATIONS: [Op; 4] = [Op::Match, Op::MisMatch, Op::Del, Op::In];

fn choose_op<R: Rng>(rng: &mut R, p: &Profile) -> Op {
    match OPERATIONS.choose_weighted(rng, |e| e.weight(p)) {
        Ok(&op) => op,
        Err(_) => Op::Match,
    }
}

/// Nucleotide level substitutions, insertions, and deletions.
pub fn introduce_randomness<R: Rng>(seq: &[u8], rng: &mut R, p: &Profile) -> Vec<u8> {
    let mut res = vec![];
    let mut remainings: Vec<_> = seq.iter().copied().rev().collect();
    while let Some(&base) = remainings.last() {
        match choose_op(rng, p) {
            Op::Match => res.push(base),
            Op::MisMatch => res.push(choose_base(rng, base)),
            Op::In => {
                res.push(random_base(rng));
                continue;
            }
            Op::Del => {}
        }
        remainings.pop();
    }
    res
}

/// Substitutions on each nucleotide, insertions and deletions of whole codons.
/// The length stays a multiple of 3.
pub fn introduce_codon_indels<R: Rng>(seq: &[u8], rng: &mut R, p: &Profile) -> Vec<u8> {
    let mut res = vec![];
    let mut remainings: Vec<_> = seq.chunks(3).rev().collect();
    while let Some(&codon) = remainings.last() {
        match choose_op(rng, p) {
            Op::Match => res.extend_from_slice(codon),
            Op::MisMatch => {
                let pos = rng.gen_range(0..codon.len());
                res.extend(codon.iter().enumerate().map(|(i, &base)| match i == pos {
                    true => choose_base(rng, base),
                    false => base,
                }));
            }
            Op::In => {
                res.extend(random_codon(rng));
                continue;
            }
            Op::Del => {}
        }
        remainings.pop();
    }
    res
}

/// Replace each nucleotide by `N` with probability `rate`.
pub fn introduce_ambiguity<R: Rng>(seq: &[u8], rng: &mut R, rate: f64) -> Vec<u8> {
    seq.iter()
        .map(|&base| match rng.gen_bool(rate) {
            true => b'N',
            false => base,
        })
        .collect()
}

pub fn generate_seq<R: Rng>(rng: &mut R, len: usize) -> Vec<u8> {
    let bases = b"ACTG";
    (0..len)
        .filter_map(|_| bases.choose(rng))
        .copied()
        .collect()
}

/// Random sense codons, `codons * 3` nucleotides in total.
pub fn generate_coding_seq<R: Rng>(rng: &mut R, codons: usize) -> Vec<u8> {
    (0..codons).flat_map(|_| random_codon(rng)).collect()
}

fn random_codon<R: Rng>(rng: &mut R) -> Vec<u8> {
    loop {
        let codon = generate_seq(rng, 3);
        let index = codon
            .iter()
            .fold(0, |acc, &b| (acc << 2) | crate::alphabet::encode(b) as usize);
        if GENETIC_CODE[index] != b'*' {
            return codon;
        }
    }
}

fn choose_base<R: Rng>(rng: &mut R, base: u8) -> u8 {
    let bases: Vec<u8> = b"ATCG".iter().filter(|&&e| e != base).copied().collect();
    bases.choose(rng).copied().unwrap_or(base)
}
fn random_base<R: Rng>(rng: &mut R) -> u8 {
    *b"ATGC".choose(rng).unwrap_or(&b'A')
}
