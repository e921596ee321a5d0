//! Fixed-width ASCII viewport printer (component I), grounded on
//! `print_spreadsheet`: a 4-character row label followed by each cell
//! rendered left-justified in an 8-character field, `ERR` for errored
//! cells.

use std::io::Write;

use crate::engine::Engine;
use crate::key;
use crate::viewport::{Viewport, VIEWPORT_SIZE};

pub fn print_grid<W: Write>(out: &mut W, engine: &Engine, viewport: &Viewport) -> std::io::Result<()> {
    let display_rows = (engine.rows() - viewport.row).min(VIEWPORT_SIZE);
    let display_cols = (engine.cols() - viewport.col).min(VIEWPORT_SIZE);

    write!(out, "    ")?;
    for c in viewport.col..viewport.col + display_cols {
        write!(out, "{:<8}", key::column_name(c + 1))?;
    }
    writeln!(out)?;

    for r in viewport.row..viewport.row + display_rows {
        write!(out, "{:<4}", r + 1)?;
        for c in viewport.col..viewport.col + display_cols {
            let cell = engine.get_cell(r, c);
            if cell.error {
                write!(out, "{:<8}", "ERR")?;
            } else {
                write!(out, "{:<8}", cell.value)?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}
