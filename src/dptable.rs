use crate::op::{Op, State, Trace};

/// Dense (row x column) table. Cells out of the table read as the upper bound.
#[derive(Debug, Clone)]
pub struct DPTable<T> {
    mem: Vec<T>,
    row: usize,
    column: usize,
    upperbound: T,
}

impl<T: Copy> DPTable<T> {
    pub fn new(row: usize, column: usize, ub: T) -> Self {
        Self {
            mem: vec![ub; row * column],
            row,
            column,
            upperbound: ub,
        }
    }
    pub fn set(&mut self, i: usize, j: usize, target: T) {
        assert!(i < self.row && j < self.column);
        self.mem[i * self.column + j] = target;
    }
    pub fn get(&self, i: usize, j: usize) -> T {
        match i < self.row && j < self.column {
            true => self.mem[i * self.column + j],
            false => self.upperbound,
        }
    }
}

/// The three cost sheets of the affine gap DP and their predecessor tags.
/// `best` is the minimum of the three states, its tag tells which of them won.
#[derive(Debug, Clone)]
pub struct GotohTable {
    pub best: DPTable<f64>,
    pub ins: DPTable<f64>,
    pub del: DPTable<f64>,
    pub best_trace: DPTable<Option<Trace>>,
    pub ins_trace: DPTable<Option<Trace>>,
    pub del_trace: DPTable<Option<Trace>>,
}

impl GotohTable {
    /// Every cell is unreachable except the origin.
    pub fn new(row: usize, column: usize) -> Self {
        let mut table = Self {
            best: DPTable::new(row, column, f64::INFINITY),
            ins: DPTable::new(row, column, f64::INFINITY),
            del: DPTable::new(row, column, f64::INFINITY),
            best_trace: DPTable::new(row, column, None),
            ins_trace: DPTable::new(row, column, None),
            del_trace: DPTable::new(row, column, None),
        };
        table.best.set(0, 0, 0f64);
        table.best_trace.set(0, 0, Some(Trace::Match));
        table
    }
    /// The state the best path to (i,j) ends with.
    pub fn state(&self, i: usize, j: usize) -> Option<State> {
        self.best_trace.get(i, j).map(Trace::state)
    }
    /// Walk back from (i,j) to the origin. Each gap step consumes `step` columns.
    pub fn traceback(&self, i: usize, j: usize, step: usize) -> Vec<Op> {
        let (mut i, mut j) = (i, j);
        let mut state = State::Match;
        let mut ops = Vec::with_capacity(i + j);
        let prev = |x: usize, len: usize| -> usize {
            match x.checked_sub(len) {
                Some(x) => x,
                None => panic!("traceback stepped past the origin"),
            }
        };
        while 0 < i || 0 < j {
            match state {
                State::Match => match self.best_trace.get(i, j) {
                    Some(Trace::Match) => {
                        ops.push(Op::Match);
                        i = prev(i, 1);
                        j = prev(j, 1);
                    }
                    Some(trace) => state = trace.state(),
                    None => panic!("unreachable cell ({},{}) on the path", i, j),
                },
                State::Insert => {
                    let trace = self.ins_trace.get(i, j);
                    ops.extend(std::iter::repeat(Op::Ins).take(step));
                    j = prev(j, step);
                    match trace {
                        Some(Trace::InsertOpen) => state = State::Match,
                        Some(Trace::InsertExtend) => {}
                        _ => panic!("broken insertion at ({},{})", i, j + step),
                    }
                }
                State::Delete => {
                    let trace = self.del_trace.get(i, j);
                    ops.extend(std::iter::repeat(Op::Del).take(step));
                    i = prev(i, step);
                    match trace {
                        Some(Trace::DeleteOpen) => state = State::Match,
                        Some(Trace::DeleteExtend) => {}
                        _ => panic!("broken deletion at ({},{})", i + step, j),
                    }
                }
            }
        }
        ops.reverse();
        ops
    }
}
