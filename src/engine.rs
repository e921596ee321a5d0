//! The engine: ties components A–H together behind the public
//! `set_cell`/`get_cell` surface. This is the only module the shell layer
//! talks to; it never reaches past this API into the store, parser, or
//! recomputer directly.

use crate::cell::{self, Formula};
use crate::cycle;
use crate::deps;
use crate::eval;
use crate::key::{self, CellRef};
use crate::parser::{self, Operand as ParsedOperand, ParsedExpr};
use crate::recompute;
use crate::status::Status;
use crate::store::{GridError, Store};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SetOutcome {
    pub status: Status,
    pub sleep_seconds: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellView {
    pub value: i32,
    pub error: bool,
}

pub struct Engine {
    store: Store,
}

impl Engine {
    pub fn new(rows: i32, cols: i32) -> Result<Engine, GridError> {
        Ok(Engine { store: Store::new(rows, cols)? })
    }

    pub fn rows(&self) -> i32 {
        self.store.rows()
    }

    pub fn cols(&self) -> i32 {
        self.store.cols()
    }

    pub fn in_bounds(&self, row: i32, col: i32) -> bool {
        self.store.in_bounds(row, col)
    }

    pub fn get_cell(&self, row: i32, col: i32) -> CellView {
        let key = self.store.key(row, col);
        let cell = self.store.get(key);
        CellView { value: cell.value, error: cell.error }
    }

    /// Resolves a `CellRef` parsed out of an expression against the live
    /// grid dimensions, turning it into a flat key or an `InvalidCell`.
    fn resolve_ref(&self, r: CellRef) -> Result<i32, Status> {
        if key::in_bounds(r, self.store.rows(), self.store.cols()) {
            Ok(self.store.key(r.row, r.col))
        } else {
            Err(Status::InvalidCell)
        }
    }

    fn resolve_operand(&self, op: ParsedOperand) -> Result<cell::Operand, Status> {
        match op {
            ParsedOperand::Literal(v) => Ok(cell::Operand::Literal(v)),
            ParsedOperand::Ref(r) => Ok(cell::Operand::Cell(self.resolve_ref(r)?)),
        }
    }

    fn resolve_formula(&self, parsed: ParsedExpr) -> Result<Formula, Status> {
        match parsed {
            ParsedExpr::Literal(v) => Ok(Formula::Literal(v)),
            ParsedExpr::Ref(r) => Ok(Formula::Ref(self.resolve_ref(r)?)),
            ParsedExpr::Range { kind, range } => {
                let start = self.resolve_ref(range.start)?;
                let end = self.resolve_ref(range.end)?;
                Ok(Formula::Range { kind, start, end })
            }
            ParsedExpr::SleepLiteral(v) => Ok(Formula::SleepLit(v)),
            ParsedExpr::SleepRef(r) => Ok(Formula::SleepRef(self.resolve_ref(r)?)),
            ParsedExpr::BinOp { op, left, right } => Ok(Formula::BinOp {
                op,
                left: self.resolve_operand(left)?,
                right: self.resolve_operand(right)?,
            }),
        }
    }

    /// Assigns `expr` to `(row, col)`: parse, cycle-check, swap edges,
    /// evaluate, recompute descendants. Parse- and graph-time rejections
    /// leave the store bit-identical to its pre-call state.
    pub fn set_cell(&mut self, row: i32, col: i32, expr: &str) -> SetOutcome {
        if !self.store.in_bounds(row, col) {
            return SetOutcome { status: Status::InvalidCell, sleep_seconds: 0 };
        }
        let x_key = self.store.key(row, col);

        let parsed = match parser::parse(expr) {
            Ok(p) => p,
            Err(parser::ParseError::Unrecognized) => {
                return SetOutcome { status: Status::Unrecognized, sleep_seconds: 0 }
            }
            Err(parser::ParseError::InvalidRange) => {
                return SetOutcome { status: Status::InvalidRange, sleep_seconds: 0 }
            }
            Err(parser::ParseError::InvalidCell) => {
                return SetOutcome { status: Status::InvalidCell, sleep_seconds: 0 }
            }
        };

        let new_formula = match self.resolve_formula(parsed) {
            Ok(f) => f,
            Err(status) => return SetOutcome { status, sleep_seconds: 0 },
        };

        let cols = self.store.cols();
        let new_parents = new_formula.parent_keys(cols);
        if cycle::would_create_cycle(&self.store, x_key, &new_parents) {
            return SetOutcome { status: Status::CircularRef, sleep_seconds: 0 };
        }

        let any_parent_errored = new_parents.iter().any(|&p| self.store.get(p).error);

        let old_formula = self.store.get(x_key).formula;
        deps::remove_edges(&mut self.store, x_key, &old_formula);
        deps::add_edges(&mut self.store, x_key, &new_formula);
        self.store.get_mut(x_key).formula = new_formula;

        let outcome = eval::evaluate(&self.store, &new_formula);
        {
            let cell = self.store.get_mut(x_key);
            cell.value = outcome.value;
            cell.error = outcome.error;
        }

        let status = if !outcome.error {
            Status::Ok
        } else if any_parent_errored {
            Status::RangeError
        } else {
            Status::DivByZero
        };

        let descendant_sleep = recompute::recompute_descendants(&mut self.store, x_key);

        SetOutcome { status, sleep_seconds: outcome.sleep_seconds + descendant_sleep }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s1_basic_propagation() {
        let mut e = Engine::new(2, 2).unwrap();
        assert_eq!(e.set_cell(0, 0, "2").status, Status::Ok);
        assert_eq!(e.set_cell(0, 1, "A1+1").status, Status::Ok);
        assert_eq!(e.set_cell(1, 0, "MAX(A1:B1)").status, Status::Ok);
        assert_eq!(e.get_cell(0, 0).value, 2);
        assert_eq!(e.get_cell(0, 1).value, 3);
        assert_eq!(e.get_cell(1, 0).value, 3);
        assert!(!e.get_cell(1, 0).error);
    }

    #[test]
    fn s2_reassignment_propagates() {
        let mut e = Engine::new(2, 2).unwrap();
        e.set_cell(0, 0, "2");
        e.set_cell(0, 1, "A1+1");
        e.set_cell(1, 0, "MAX(A1:B1)");
        e.set_cell(0, 0, "5");
        assert_eq!(e.get_cell(0, 0).value, 5);
        assert_eq!(e.get_cell(0, 1).value, 6);
        assert_eq!(e.get_cell(1, 0).value, 6);
    }

    #[test]
    fn s3_division_by_zero_taints_and_clears() {
        let mut e = Engine::new(3, 3).unwrap();
        e.set_cell(0, 0, "1");
        e.set_cell(0, 1, "A1-1");
        let outcome = e.set_cell(0, 2, "10/B1");
        assert_eq!(outcome.status, Status::DivByZero);
        assert_eq!(e.get_cell(0, 0).value, 1);
        assert_eq!(e.get_cell(0, 1).value, 0);
        assert!(e.get_cell(0, 2).error);

        let outcome = e.set_cell(0, 0, "2");
        assert_eq!(outcome.status, Status::Ok);
        assert_eq!(e.get_cell(0, 0).value, 2);
        assert_eq!(e.get_cell(0, 1).value, 1);
        assert_eq!(e.get_cell(0, 2).value, 10);
        assert!(!e.get_cell(0, 2).error);
    }

    #[test]
    fn s4_cycle_rejected_state_preserved() {
        let mut e = Engine::new(2, 2).unwrap();
        e.set_cell(0, 0, "1");
        e.set_cell(0, 1, "A1+1");
        let outcome = e.set_cell(0, 0, "B1+1");
        assert_eq!(outcome.status, Status::CircularRef);
        assert_eq!(e.get_cell(0, 0).value, 1);
        assert_eq!(e.get_cell(0, 1).value, 2);
    }

    #[test]
    fn s5_range_aggregates() {
        let mut e = Engine::new(4, 2).unwrap();
        e.set_cell(0, 0, "1");
        e.set_cell(1, 0, "2");
        e.set_cell(2, 0, "3");
        e.set_cell(3, 0, "4");
        e.set_cell(0, 1, "SUM(A1:A4)");
        e.set_cell(1, 1, "AVG(A1:A4)");
        e.set_cell(2, 1, "MIN(A1:A4)");
        e.set_cell(3, 1, "MAX(A1:A4)");
        assert_eq!(e.get_cell(0, 1).value, 10);
        assert_eq!(e.get_cell(1, 1).value, 2);
        assert_eq!(e.get_cell(2, 1).value, 1);
        assert_eq!(e.get_cell(3, 1).value, 4);
    }

    #[test]
    fn s6_inverted_range_is_invalid() {
        let mut e = Engine::new(2, 2).unwrap();
        let outcome = e.set_cell(1, 0, "MAX(B1:A1)");
        assert_eq!(outcome.status, Status::InvalidRange);
        assert_eq!(e.get_cell(1, 0).value, 0);
    }

    #[test]
    fn rejection_leaves_state_untouched() {
        let mut e = Engine::new(2, 2).unwrap();
        e.set_cell(0, 0, "7");
        let before = e.get_cell(0, 0);
        let outcome = e.set_cell(0, 0, "not an expression @@@");
        assert_eq!(outcome.status, Status::Unrecognized);
        assert_eq!(e.get_cell(0, 0), before);
    }

    #[test]
    fn out_of_grid_reference_is_invalid_cell() {
        let mut e = Engine::new(2, 2).unwrap();
        let outcome = e.set_cell(0, 0, "Z99");
        assert_eq!(outcome.status, Status::InvalidCell);
    }

    #[test]
    fn sleep_literal_reports_pending_seconds() {
        let mut e = Engine::new(1, 1).unwrap();
        let outcome = e.set_cell(0, 0, "SLEEP(3)");
        assert_eq!(outcome.status, Status::Ok);
        assert_eq!(outcome.sleep_seconds, 3);
        assert_eq!(e.get_cell(0, 0).value, 3);
    }

    #[test]
    fn idempotent_reassignment_leaves_dependents_unchanged() {
        let mut e = Engine::new(2, 1).unwrap();
        e.set_cell(0, 0, "5");
        e.set_cell(1, 0, "A1+1");
        e.set_cell(0, 0, "5");
        assert_eq!(e.get_cell(1, 0).value, 6);
    }
}
