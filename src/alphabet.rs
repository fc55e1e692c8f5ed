//! Nucleotide and codon encodings.
//!
//! Every table here is a `const`, so the engine can be called from any number of
//! threads without synchronization.

// Two bit encoding for each base. `N` (and anything we cannot read) is 4, a gap is 5.
pub const ADENINE: u8 = 0b000;
pub const CYTOSINE: u8 = 0b001;
pub const GUANINE: u8 = 0b010;
pub const THYMINE: u8 = 0b011;
pub const ANY: u8 = 0b100;
pub const GAP: u8 = 0b101;

/// The gap symbol used in alignments.
pub const GAP_SYMBOL: u8 = b'-';

const fn lookup_table() -> [u8; 256] {
    let mut slots = [ANY; 256];
    slots[b'A' as usize] = ADENINE;
    slots[b'a' as usize] = ADENINE;
    slots[b'C' as usize] = CYTOSINE;
    slots[b'c' as usize] = CYTOSINE;
    slots[b'G' as usize] = GUANINE;
    slots[b'g' as usize] = GUANINE;
    slots[b'T' as usize] = THYMINE;
    slots[b't' as usize] = THYMINE;
    slots[b'-' as usize] = GAP;
    slots
}
pub const LOOKUP_TABLE: [u8; 256] = lookup_table();

// Convert a char into its nucleotide code.
pub const fn encode(base: u8) -> u8 {
    LOOKUP_TABLE[base as usize]
}

pub const fn is_gap(base: u8) -> bool {
    base == GAP_SYMBOL
}

/// Codon index, AAA -> 0, AAC -> 1, ..., TTT -> 63.
/// Each argument should be a concrete nucleotide code (0..4).
pub const fn codon_index(first: u8, second: u8, third: u8) -> usize {
    ((first as usize) << 4) | ((second as usize) << 2) | third as usize
}

/// The nucleotide code at `pos` (0, 1, or 2) of the `codon`-th codon.
pub const fn codon_base(codon: usize, pos: usize) -> u8 {
    ((codon >> (2 * (2 - pos))) & 0b11) as u8
}

// Number of positions where the two codons differ.
pub const fn codon_distance(c1: usize, c2: usize) -> usize {
    let mut pos = 0;
    let mut diff = 0;
    while pos < 3 {
        if codon_base(c1, pos) != codon_base(c2, pos) {
            diff += 1;
        }
        pos += 1;
    }
    diff
}

/// Standard genetic code in codon index order. Stop codons are `*`.
pub const GENETIC_CODE: &[u8; 64] =
    b"KNKNTTTTRSRSIIMIQHQHPPPPRRRRLLLLEDEDAAAAGGGGVVVV*Y*YSSSS*CWCLFLF";

pub fn is_synonymous(c1: usize, c2: usize) -> bool {
    GENETIC_CODE[c1] == GENETIC_CODE[c2]
}
