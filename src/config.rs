//! CLI/config (component J): validates `argv` into grid dimensions before
//! an `Engine` is constructed.

use crate::key;

pub struct Config {
    pub rows: i32,
    pub cols: i32,
}

#[derive(Debug)]
pub enum ConfigError {
    Usage { prog: String },
    NotANumber { arg: String },
    OutOfRange { rows: i32, cols: i32 },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Usage { prog } => write!(f, "Usage: {prog} <rows> <columns>"),
            ConfigError::NotANumber { arg } => write!(f, "Invalid number: {arg}"),
            ConfigError::OutOfRange { rows, cols } => write!(
                f,
                "Invalid spreadsheet dimensions: {rows}x{cols} (rows must be 1..={}, cols 1..={})",
                key::MAX_ROWS,
                key::MAX_COLS
            ),
        }
    }
}

pub fn parse_args(args: &[String]) -> Result<Config, ConfigError> {
    if args.len() != 3 {
        return Err(ConfigError::Usage { prog: args.first().cloned().unwrap_or_default() });
    }
    let rows: i32 = args[1].parse().map_err(|_| ConfigError::NotANumber { arg: args[1].clone() })?;
    let cols: i32 = args[2].parse().map_err(|_| ConfigError::NotANumber { arg: args[2].clone() })?;
    if rows < 1 || rows > key::MAX_ROWS || cols < 1 || cols > key::MAX_COLS {
        return Err(ConfigError::OutOfRange { rows, cols });
    }
    Ok(Config { rows, cols })
}
