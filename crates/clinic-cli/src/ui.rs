//! Terminal preferences resolved once from global flags and the environment.

use std::io::IsTerminal;
use std::sync::OnceLock;

use crate::cli::{GlobalFlags, OutputFormat};

/// Narrower `COLUMNS` values are ignored.
const MIN_COLUMNS: usize = 40;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UiPrefs {
    /// Colorize table output.
    pub table_color: bool,
    /// Show the AI spinner on stderr.
    pub spinner: bool,
    /// Width tables are fitted to.
    pub columns: Option<usize>,
}

/// What the process can observe about its terminal.
#[derive(Clone, Copy, Debug, Default)]
struct Terminal {
    stdout_tty: bool,
    stderr_tty: bool,
    no_color: bool,
}

impl UiPrefs {
    fn resolve(flags: &GlobalFlags, term: Terminal, columns: Option<&str>) -> Self {
        let interactive = !flags.quiet;
        Self {
            table_color: interactive
                && term.stdout_tty
                && !term.no_color
                && flags.format == OutputFormat::Table,
            spinner: interactive && term.stderr_tty,
            columns: columns
                .and_then(|raw| raw.trim().parse().ok())
                .filter(|width| *width >= MIN_COLUMNS),
        }
    }
}

static PREFS: OnceLock<UiPrefs> = OnceLock::new();

/// Resolve preferences for this run. Later calls are ignored.
pub fn init(flags: &GlobalFlags) {
    let term = Terminal {
        stdout_tty: std::io::stdout().is_terminal(),
        stderr_tty: std::io::stderr().is_terminal(),
        no_color: std::env::var_os("NO_COLOR").is_some(),
    };
    let columns = std::env::var("COLUMNS").ok();
    let _ = PREFS.set(UiPrefs::resolve(flags, term, columns.as_deref()));
}

/// Preferences from [`init`], or plain output if it never ran.
#[must_use]
pub fn prefs() -> UiPrefs {
    PREFS.get().copied().unwrap_or_default()
}
