use crate::alphabet::GAP_SYMBOL;
use serde::{Deserialize, Serialize};

/// One column of a pairwise alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Op {
    Match,
    // Gap in the reference.
    Ins,
    // Gap in the query.
    Del,
}

impl std::fmt::Display for Op {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use std::fmt::Write;
        let op = match self {
            Op::Match => 'M',
            Op::Ins => 'I',
            Op::Del => 'D',
        };
        f.write_char(op)
    }
}

/// The state an alignment path ends with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Match,
    Insert,
    Delete,
}

/// Predecessor tag of a DP cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trace {
    Match,
    InsertOpen,
    InsertExtend,
    DeleteOpen,
    DeleteExtend,
}

impl Trace {
    pub fn state(self) -> State {
        match self {
            Trace::Match => State::Match,
            Trace::InsertOpen | Trace::InsertExtend => State::Insert,
            Trace::DeleteOpen | Trace::DeleteExtend => State::Delete,
        }
    }
}

/// Lay out the rows along `ops`. The rows of `xs` (the reference side) come first, then `ys`.
/// Every row of the same side should have the same length.
pub fn recover<T, U>(xs: &[T], ys: &[U], ops: &[Op]) -> Vec<Vec<u8>>
where
    T: AsRef<[u8]>,
    U: AsRef<[u8]>,
{
    let mut rows: Vec<Vec<u8>> = vec![Vec::with_capacity(ops.len()); xs.len() + ys.len()];
    let (x_rows, y_rows) = rows.split_at_mut(xs.len());
    let (mut i, mut j) = (0, 0);
    for &op in ops {
        let (x_advance, y_advance) = match op {
            Op::Match => (true, true),
            Op::Ins => (false, true),
            Op::Del => (true, false),
        };
        for (row, xs) in x_rows.iter_mut().zip(xs.iter()) {
            row.push(if x_advance { xs.as_ref()[i] } else { GAP_SYMBOL });
        }
        for (row, ys) in y_rows.iter_mut().zip(ys.iter()) {
            row.push(if y_advance { ys.as_ref()[j] } else { GAP_SYMBOL });
        }
        i += x_advance as usize;
        j += y_advance as usize;
    }
    if let Some(x) = xs.first() {
        assert_eq!(i, x.as_ref().len());
    }
    if let Some(y) = ys.first() {
        assert_eq!(j, y.as_ref().len());
    }
    rows
}
