use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Outbound call statistics from a call-log CSV export
#[derive(Parser, Debug, Clone)]
#[command(
    name = "callstats",
    about = "Outbound call statistics from a call-log CSV export",
    version
)]
pub struct Settings {
    /// Call-log export (comma-separated, first row is the header)
    pub file: PathBuf,

    /// Which table to print
    #[arg(long, default_value = "all", value_parser = ["calls", "minutes", "hourly", "all"])]
    pub view: String,

    /// Output format
    #[arg(long, default_value = "table", value_parser = ["table", "json"])]
    pub format: String,

    /// Fail on the first call with a malformed `date_started`
    #[arg(long)]
    pub strict: bool,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path (logs go to stderr when unset)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments and resolve derived values.
    pub fn load() -> Self {
        Self::load_from_args(std::env::args_os())
    }

    /// Same as [`Settings::load`] but accepts an explicit argument list,
    /// enabling unit-testing without spawning subprocesses.
    pub fn load_from_args<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::resolve(Settings::parse_from(args))
    }

    /// `true` when the table named `view` should be printed.
    pub fn shows(&self, view: &str) -> bool {
        self.view == "all" || self.view == view
    }

    /// `--debug` overrides the log level.
    fn resolve(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────
