//! Parameters of the alignment.
use crate::alphabet::ANY;
use crate::codon::NUCLEOTIDE_FREQS;
use serde::{Deserialize, Serialize};

/// Geometric gap model. Probabilities, not costs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GapModel {
    /// Probability to open a gap.
    pub open: f64,
    /// Probability to extend a gap by one more nucleotide.
    pub extend: f64,
    /// Background frequencies of A, C, G, and T, emitting the inserted bases.
    pub background: [f64; 4],
    /// Background frequency of N.
    pub any_background: f64,
}

impl std::default::Default for GapModel {
    fn default() -> Self {
        Self {
            open: 0.001,
            extend: 1f64 - 1f64 / 6f64,
            background: NUCLEOTIDE_FREQS,
            any_background: 0.25,
        }
    }
}

impl GapModel {
    pub fn costs(&self) -> GapCosts {
        let mut background = [0f64; 5];
        background
            .iter_mut()
            .zip(self.background.iter())
            .for_each(|(x, y)| *x = -y.ln());
        background[ANY as usize] = -self.any_background.ln();
        GapCosts {
            open: -self.open.ln(),
            no_open: -(1f64 - self.open).ln(),
            extend: -self.extend.ln(),
            close: -(1f64 - self.extend).ln(),
            background,
            freqs: self.background,
        }
    }
}

/// The gap model in `-ln` scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GapCosts {
    pub open: f64,
    pub no_open: f64,
    pub extend: f64,
    pub close: f64,
    // A, C, G, T, N
    background: [f64; 5],
    freqs: [f64; 4],
}

impl GapCosts {
    /// Cost to emit the nucleotide code from the background.
    pub fn background(&self, code: u8) -> f64 {
        self.background[code.min(ANY) as usize]
    }
    pub fn background_freqs(&self) -> &[f64; 4] {
        &self.freqs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    /// Gaps of any length.
    Marginal,
    /// Gaps in whole codons only.
    FramePreserving,
}

impl Mode {
    /// The number of nucleotides a gap consumes at once.
    pub fn step(&self) -> usize {
        match self {
            Mode::Marginal => 1,
            Mode::FramePreserving => 3,
        }
    }
}

impl std::str::FromStr for Mode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "marginal" => Ok(Mode::Marginal),
            "frame" | "frame-preserving" => Ok(Mode::FramePreserving),
            _ => Err(format!("unknown mode: {}", s)),
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Marginal => write!(f, "marginal"),
            Mode::FramePreserving => write!(f, "frame"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlignConfig {
    pub gap: GapModel,
    pub mode: Mode,
}

impl AlignConfig {
    pub fn new(gap: GapModel, mode: Mode) -> Self {
        Self { gap, mode }
    }
}

impl std::default::Default for AlignConfig {
    fn default() -> Self {
        Self {
            gap: GapModel::default(),
            mode: Mode::Marginal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn costs() {
        let costs = GapModel::default().costs();
        assert!((costs.open - 6.907755).abs() < 1e-6);
        assert!((costs.extend - 0.182322).abs() < 1e-6);
        assert!((costs.close - 1.791759).abs() < 1e-6);
        assert!((costs.background(ANY) - 1.386294).abs() < 1e-6);
        assert_eq!(costs.background(7), costs.background(ANY));
        let freqs = costs.background_freqs();
        assert_eq!(freqs[1], 0.185);
    }
    #[test]
    fn mode() {
        assert_eq!("frame".parse::<Mode>(), Ok(Mode::FramePreserving));
        assert_eq!("marginal".parse::<Mode>(), Ok(Mode::Marginal));
        assert!("codon".parse::<Mode>().is_err());
        assert_eq!(Mode::FramePreserving.step(), 3);
    }
}
