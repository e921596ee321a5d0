//! Cell store record: the tagged `Formula` payload plus the fixed fields
//! every cell carries (component C).
//!
//! Each formula shape gets its own variant and only the fields it actually
//! needs, instead of packing every shape into the same two `int` slots
//! disambiguated by a numeric code, which lets nonsensical combinations
//! type-check (a literal with a "left operand is a cell" tag, say).

/// An operand to a binary operation: either another cell's value or a bare
/// literal baked into the formula at assignment time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    Cell(i32),
    Literal(i32),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeFn {
    Sum,
    Avg,
    Min,
    Max,
    Stdev,
}

/// The categorical shape of a cell's computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula {
    Literal(i32),
    Ref(i32),
    BinOp { op: BinOp, left: Operand, right: Operand },
    Range { kind: RangeFn, start: i32, end: i32 },
    SleepLit(i32),
    SleepRef(i32),
}

/// The stable opcode family a `Formula` belongs to: callers that only care
/// about the formula's *shape* (not its operand values) can match on this
/// instead of destructuring `Formula` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpCode {
    Literal,
    Ref,
    Add,
    Sub,
    Mul,
    Div,
    Sum,
    Avg,
    Min,
    Max,
    Stdev,
    SleepLit,
    SleepRef,
}

impl Formula {
    /// Reconstructs the stable `(opcode, op1, op2)` triple. `op2` is `0` for
    /// shapes that don't use a second slot.
    pub fn to_opcode(&self) -> (OpCode, i32, i32) {
        match *self {
            Formula::Literal(v) => (OpCode::Literal, v, 0),
            Formula::Ref(key) => (OpCode::Ref, key, 0),
            Formula::BinOp { op, left, right } => {
                let code = match op {
                    BinOp::Add => OpCode::Add,
                    BinOp::Sub => OpCode::Sub,
                    BinOp::Mul => OpCode::Mul,
                    BinOp::Div => OpCode::Div,
                };
                let slot = |o: Operand| match o {
                    Operand::Cell(k) => k,
                    Operand::Literal(v) => v,
                };
                (code, slot(left), slot(right))
            }
            Formula::Range { kind, start, end } => {
                let code = match kind {
                    RangeFn::Sum => OpCode::Sum,
                    RangeFn::Avg => OpCode::Avg,
                    RangeFn::Min => OpCode::Min,
                    RangeFn::Max => OpCode::Max,
                    RangeFn::Stdev => OpCode::Stdev,
                };
                (code, start, end)
            }
            Formula::SleepLit(v) => (OpCode::SleepLit, v, 0),
            Formula::SleepRef(key) => (OpCode::SleepRef, key, 0),
        }
    }

    /// The parent cell keys this formula reads from, re-derived on demand
    /// rather than stored, since edges live only on the parent side as
    /// dependents. `cols` is needed to expand a range's corner keys into
    /// every cell inside the rectangle.
    pub fn parent_keys(&self, cols: i32) -> Vec<i32> {
        match *self {
            Formula::Literal(_) => Vec::new(),
            Formula::Ref(key) | Formula::SleepRef(key) => vec![key],
            Formula::BinOp { left, right, .. } => {
                let mut keys = Vec::new();
                if let Operand::Cell(k) = left {
                    keys.push(k);
                }
                if let Operand::Cell(k) = right {
                    keys.push(k);
                }
                keys
            }
            Formula::Range { start, end, .. } => {
                let (r1, c1) = crate::key::decode(start, cols);
                let (r2, c2) = crate::key::decode(end, cols);
                let mut keys = Vec::with_capacity(((r2 - r1 + 1) * (c2 - c1 + 1)) as usize);
                for r in r1..=r2 {
                    for c in c1..=c2 {
                        keys.push(crate::key::encode(r, c, cols));
                    }
                }
                keys
            }
            Formula::SleepLit(_) => Vec::new(),
        }
    }
}

/// A single cell's record: last computed value/error, its formula, and the
/// ordered set of cells that read it (empty for leaves).
pub struct Cell {
    pub value: i32,
    pub error: bool,
    pub formula: Formula,
    pub dependents: crate::avl::KeySet,
}

impl Cell {
    pub fn new() -> Self {
        Cell {
            value: 0,
            error: false,
            formula: Formula::Literal(0),
            dependents: crate::avl::KeySet::new(),
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_formula_parents_cover_every_cell_in_the_rectangle() {
        // cols = 4; A1:B2 spans keys 0,1,4,5
        let f = Formula::Range { kind: RangeFn::Sum, start: 0, end: 5 };
        assert_eq!(f.parent_keys(4), vec![0, 1, 4, 5]);
    }

    #[test]
    fn binop_parents_only_include_cell_operands() {
        let f = Formula::BinOp {
            op: BinOp::Add,
            left: Operand::Cell(5),
            right: Operand::Literal(9),
        };
        assert_eq!(f.parent_keys(10), vec![5]);
    }
}
