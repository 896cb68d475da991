//! Console output for the CLI.
//!
//! Progress and success lines go to stdout, warnings and errors to stderr.
//! Success lines are styled; everything else is printed plain.

use console::style;
use std::fmt::Display;
use std::io::{self, Write};

/// Process exit codes.
///
/// `extract` only distinguishes success from failure; every fatal error,
/// including an unsupported input format, exits with 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Command succeeded (0)
    Success = 0,

    /// Any fatal error (1)
    Failure = 1,
}

impl ExitCode {
    /// Convert exit code to i32 for `std::process::exit`
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Context for controlling output verbosity
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputContext {
    quiet: bool,
}

impl OutputContext {
    /// Create a new output context
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }

    /// Print informational message (suppressed by --quiet)
    pub fn print_info(&self, msg: impl Display) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln_safe(&msg.to_string())
    }

    /// Print success message in the success style (suppressed by --quiet)
    pub fn print_success(&self, msg: impl Display) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln_safe(&style(msg).green().bold().to_string())
    }

    /// Print warning (suppressed by --quiet)
    pub fn print_warning(&self, msg: impl Display) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        writeln_safe_stderr(&format!("Warning: {}", msg))
    }

    /// Print error (always shown to stderr)
    pub fn print_error(&self, msg: impl Display) -> io::Result<()> {
        writeln_safe_stderr(&format!("Error: {}", msg))
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.quiet
    }
}

/// Safe println that handles broken pipes gracefully
fn writeln_safe(msg: &str) -> io::Result<()> {
    match writeln!(io::stdout(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            // Silently exit on broken pipe (expected when piping to head, etc.)
            std::process::exit(0);
        }
        Err(e) => Err(e),
    }
}

/// Safe eprintln that handles broken pipes gracefully
fn writeln_safe_stderr(msg: &str) -> io::Result<()> {
    match writeln!(io::stderr(), "{}", msg) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => std::process::exit(0),
        Err(e) => Err(e),
    }
}
