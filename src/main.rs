//! Interactive REPL (component I): read a line, dispatch it, print the
//! viewport and the `[<elapsed>] (<status>) > ` prompt.

use std::env;
use std::io::{self, Write};
use std::thread;
use std::time::{Duration, Instant};

use termsheet::config;
use termsheet::display;
use termsheet::engine::Engine;
use termsheet::key;
use termsheet::status::Status;
use termsheet::viewport::Viewport;

struct Shell {
    engine: Engine,
    viewport: Viewport,
    output_enabled: bool,
}

impl Shell {
    fn new(rows: i32, cols: i32) -> io::Result<Shell> {
        let engine = Engine::new(rows, cols).map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
        Ok(Shell { engine, viewport: Viewport::new(rows, cols), output_enabled: true })
    }

    /// Dispatches one command line. Returns the resulting status and the
    /// pending sleep-seconds the caller still owes the user.
    fn handle_command(&mut self, cmd: &str) -> (Status, i64) {
        match cmd {
            "disable_output" => {
                self.output_enabled = false;
                return (Status::Ok, 0);
            }
            "enable_output" => {
                self.output_enabled = true;
                return (Status::Ok, 0);
            }
            "w" => {
                self.viewport.scroll_up();
                return (Status::Ok, 0);
            }
            "s" => {
                self.viewport.scroll_down();
                return (Status::Ok, 0);
            }
            "a" => {
                self.viewport.scroll_left();
                return (Status::Ok, 0);
            }
            "d" => {
                self.viewport.scroll_right();
                return (Status::Ok, 0);
            }
            _ => {}
        }

        if let Some(target) = cmd.strip_prefix("scroll_to ") {
            return match key::parse_cell_ref(target) {
                Some(r) if self.viewport.scroll_to(r) => (Status::Ok, 0),
                _ => (Status::InvalidCell, 0),
            };
        }

        if let Some(eq) = cmd.find('=') {
            let cell_ref = &cmd[..eq];
            let expr = &cmd[eq + 1..];
            return match key::parse_cell_ref(cell_ref) {
                Some(r) if key::in_bounds(r, self.engine.rows(), self.engine.cols()) => {
                    let outcome = self.engine.set_cell(r.row, r.col, expr);
                    (outcome.status, outcome.sleep_seconds)
                }
                _ => (Status::InvalidCell, 0),
            };
        }

        (Status::Unrecognized, 0)
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let cfg = match config::parse_args(&args) {
        Ok(cfg) => cfg,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let mut shell = match Shell::new(cfg.rows, cfg.cols) {
        Ok(shell) => shell,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stdin = io::stdin();
    let mut input = String::new();

    let mut last_elapsed = 0.0_f64;
    let mut last_status = Status::Ok;
    let mut pending_sleep_seconds: i64 = 0;

    loop {
        if shell.output_enabled {
            let _ = display::print_grid(&mut out, &shell.engine, &shell.viewport);
        }
        print!("[{last_elapsed:.1}] ({}) > ", last_status.prompt_str());
        let _ = out.flush();

        input.clear();
        if stdin.read_line(&mut input).is_err() || input.is_empty() {
            break;
        }
        let cmd = input.trim_end_matches(['\n', '\r']);
        if cmd == "q" {
            break;
        }

        let start = Instant::now();
        let (status, sleep_seconds) = shell.handle_command(cmd);
        let command_time = start.elapsed().as_secs_f64();

        pending_sleep_seconds = sleep_seconds;
        let sleep_remaining = (pending_sleep_seconds as f64 - command_time).max(0.0);
        if sleep_remaining > 0.0 {
            thread::sleep(Duration::from_secs_f64(sleep_remaining));
        }
        last_elapsed = command_time + sleep_remaining;
        last_status = status;
    }
}
