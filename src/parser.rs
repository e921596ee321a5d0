//! Expression parser (component D): classifies a raw expression string into
//! one of the shapes the evaluator understands, without touching any grid
//! state. Bounds-checking referenced cells is the engine's job, since only
//! the engine knows the live `rows`/`cols`.

use crate::cell::{BinOp, RangeFn};
use crate::key::{self, CellRange, CellRef};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RANGE_FN_REGEX: Regex =
        Regex::new(r"^(SUM|AVG|MIN|MAX|STDEV)\((.+)\)$").unwrap();
    static ref SLEEP_REGEX: Regex = Regex::new(r"^SLEEP\((.+)\)$").unwrap();
    static ref CELL_REF_REGEX: Regex = Regex::new(r"^[A-Z]{1,3}[0-9]+$").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Literal(i32),
    Ref(CellRef),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedExpr {
    Literal(i32),
    Ref(CellRef),
    Range { kind: RangeFn, range: CellRange },
    SleepLiteral(i32),
    SleepRef(CellRef),
    BinOp { op: BinOp, left: Operand, right: Operand },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    Unrecognized,
    InvalidRange,
    InvalidCell,
}

fn parse_operand(s: &str) -> Result<Operand, ParseError> {
    if let Ok(n) = s.parse::<i32>() {
        return Ok(Operand::Literal(n));
    }
    match key::parse_cell_ref(s) {
        Some(r) => Ok(Operand::Ref(r)),
        None => Err(ParseError::InvalidCell),
    }
}

/// Classifies `expr` in dispatch order: range function, then SLEEP, then a
/// bare literal, then a simple reference, then a single binary operator
/// split.
pub fn parse(expr: &str) -> Result<ParsedExpr, ParseError> {
    if expr.is_empty() {
        return Err(ParseError::Unrecognized);
    }

    if let Some(caps) = RANGE_FN_REGEX.captures(expr) {
        let kind = match &caps[1] {
            "SUM" => RangeFn::Sum,
            "AVG" => RangeFn::Avg,
            "MIN" => RangeFn::Min,
            "MAX" => RangeFn::Max,
            "STDEV" => RangeFn::Stdev,
            _ => unreachable!(),
        };
        let range = key::parse_range(&caps[2]).map_err(|_| ParseError::InvalidRange)?;
        return Ok(ParsedExpr::Range { kind, range });
    }

    if let Some(caps) = SLEEP_REGEX.captures(expr) {
        let arg = &caps[1];
        if let Ok(n) = arg.parse::<i32>() {
            return Ok(ParsedExpr::SleepLiteral(n));
        }
        return match key::parse_cell_ref(arg) {
            Some(r) => Ok(ParsedExpr::SleepRef(r)),
            None => Err(ParseError::Unrecognized),
        };
    }

    if let Ok(n) = expr.parse::<i32>() {
        return Ok(ParsedExpr::Literal(n));
    }

    if CELL_REF_REGEX.is_match(expr) {
        return match key::parse_cell_ref(expr) {
            Some(r) => Ok(ParsedExpr::Ref(r)),
            None => Err(ParseError::InvalidCell),
        };
    }

    // Binary op: first +,-,*,/ at index >= 1 (index 0 is a literal's sign).
    let bytes = expr.as_bytes();
    let op_index = bytes
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, &b)| matches!(b, b'+' | b'-' | b'*' | b'/'))
        .map(|(i, _)| i);

    let op_index = match op_index {
        Some(i) => i,
        None => return Err(ParseError::Unrecognized),
    };

    let op = match bytes[op_index] {
        b'+' => BinOp::Add,
        b'-' => BinOp::Sub,
        b'*' => BinOp::Mul,
        b'/' => BinOp::Div,
        _ => unreachable!(),
    };

    let left = parse_operand(&expr[..op_index])?;
    let right = parse_operand(&expr[op_index + 1..])?;
    Ok(ParsedExpr::BinOp { op, left, right })
}
