//! Evaluator (component F): computes a cell's value and error flag from its
//! formula and the current values of its dependencies.
//!
//! The SLEEP side-channel is returned as an explicit field on `EvalOutcome`
//! instead of threaded through a shared accumulator.

use crate::cell::{BinOp, Formula, Operand, RangeFn};
use crate::key;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EvalOutcome {
    pub value: i32,
    pub error: bool,
    /// Seconds the shell should sleep after this command, or 0.
    pub sleep_seconds: i64,
}

impl EvalOutcome {
    fn plain(value: i32, error: bool) -> Self {
        EvalOutcome { value, error, sleep_seconds: 0 }
    }
}

fn operand_value(store: &Store, op: Operand) -> (i32, bool) {
    match op {
        Operand::Literal(v) => (v, false),
        Operand::Cell(key) => {
            let cell = store.get(key);
            (cell.value, cell.error)
        }
    }
}

fn apply_binop(op: BinOp, left: i32, right: i32) -> (i32, bool) {
    match op {
        BinOp::Add => (left.wrapping_add(right), false),
        BinOp::Sub => (left.wrapping_sub(right), false),
        BinOp::Mul => (left.wrapping_mul(right), false),
        BinOp::Div => {
            if right == 0 {
                (0, true)
            } else {
                (left.wrapping_div(right), false)
            }
        }
    }
}

fn range_cells(store: &Store, start: i32, end: i32) -> (i32, i32, i32, i32) {
    let cols = store.cols();
    let (r1, c1) = key::decode(start, cols);
    let (r2, c2) = key::decode(end, cols);
    (r1, c1, r2, c2)
}

fn sum_range(store: &Store, start: i32, end: i32) -> Option<i32> {
    let cols = store.cols();
    let (r1, c1, r2, c2) = range_cells(store, start, end);
    let mut sum: i32 = 0;
    for r in r1..=r2 {
        for c in c1..=c2 {
            let cell = store.get(key::encode(r, c, cols));
            if cell.error {
                return None;
            }
            sum = sum.wrapping_add(cell.value);
        }
    }
    Some(sum)
}

fn min_max_range(store: &Store, start: i32, end: i32, want_min: bool) -> Option<i32> {
    let cols = store.cols();
    let (r1, c1, r2, c2) = range_cells(store, start, end);
    let mut best: Option<i32> = None;
    for r in r1..=r2 {
        for c in c1..=c2 {
            let cell = store.get(key::encode(r, c, cols));
            if cell.error {
                return None;
            }
            best = Some(match best {
                None => cell.value,
                Some(b) if want_min => b.min(cell.value),
                Some(b) => b.max(cell.value),
            });
        }
    }
    best
}

fn stdev_range(store: &Store, start: i32, end: i32) -> Option<i32> {
    let (r1, c1, r2, c2) = range_cells(store, start, end);
    let count = ((r2 - r1 + 1) * (c2 - c1 + 1)) as i32;
    let sum = sum_range(store, start, end)?;
    let mean = sum.wrapping_div(count);
    let cols = store.cols();
    let mut variance = 0.0f64;
    for r in r1..=r2 {
        for c in c1..=c2 {
            let cell = store.get(key::encode(r, c, cols));
            if cell.error {
                return None;
            }
            let diff = (cell.value - mean) as f64;
            variance += diff * diff;
        }
    }
    variance /= count as f64;
    Some(variance.sqrt().round() as i32)
}

/// Evaluates `formula` against the store's current state. Does not mutate
/// the store; callers write the outcome back into the target cell.
pub fn evaluate(store: &Store, formula: &Formula) -> EvalOutcome {
    match *formula {
        Formula::Literal(v) => EvalOutcome::plain(v, false),

        Formula::Ref(parent_key) => {
            let parent = store.get(parent_key);
            EvalOutcome::plain(parent.value, parent.error)
        }

        Formula::BinOp { op, left, right } => {
            let (lval, lerr) = operand_value(store, left);
            let (rval, rerr) = operand_value(store, right);
            if lerr || rerr {
                return EvalOutcome::plain(0, true);
            }
            let (value, div_error) = apply_binop(op, lval, rval);
            EvalOutcome::plain(value, div_error)
        }

        Formula::Range { kind, start, end } => {
            let result = match kind {
                RangeFn::Sum => sum_range(store, start, end),
                RangeFn::Avg => {
                    let (r1, c1, r2, c2) = range_cells(store, start, end);
                    let count = (r2 - r1 + 1) * (c2 - c1 + 1);
                    sum_range(store, start, end).map(|s| s.wrapping_div(count))
                }
                RangeFn::Min => min_max_range(store, start, end, true),
                RangeFn::Max => min_max_range(store, start, end, false),
                RangeFn::Stdev => stdev_range(store, start, end),
            };
            match result {
                Some(v) => EvalOutcome::plain(v, false),
                None => EvalOutcome::plain(0, true),
            }
        }

        Formula::SleepLit(v) => EvalOutcome { value: v, error: false, sleep_seconds: v.max(0) as i64 },

        Formula::SleepRef(parent_key) => {
            let parent = store.get(parent_key);
            if parent.error {
                return EvalOutcome::plain(parent.value, true);
            }
            let sleep = if parent.value > 0 { parent.value as i64 } else { 0 };
            EvalOutcome { value: parent.value, error: false, sleep_seconds: sleep }
        }
    }
}
