use thiserror::Error;

/// Errors reported by the aligners, the score evaluator, and the I/O helpers.
/// Every variant is a problem with the input; nothing here is worth retrying.
#[derive(Debug, Error)]
pub enum AlignError {
    #[error("reference coding sequence length must be a multiple of 3 ({0})")]
    ReferenceFrame(usize),
    #[error("the length of both sequences must be a multiple of 3 ({0}, {1})")]
    OperandFrame(usize, usize),
    #[error("a profile requires at least one sequence")]
    EmptyProfile,
    #[error("a profile requires all strings of the same length ({expected} != {found})")]
    RaggedProfile { expected: usize, found: usize },
    #[error("aligned sequences must have the same length ({expected} != {found})")]
    RaggedAlignment { expected: usize, found: usize },
    #[error("expected a pairwise alignment, found {0} sequences")]
    RowCount(usize),
    #[error("an insertion right after a deletion (column {0}) has zero probability")]
    ForbiddenTransition(usize),
    #[error("substitution rate matrix: {0}")]
    RateMatrix(String),
    #[error("at least two sequences are required, found {0}")]
    TooFewSequences(usize),
    #[error("output format must be .fasta or .phy: {0}")]
    OutputFormat(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AlignError>;
