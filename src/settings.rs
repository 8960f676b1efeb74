//! The run configuration, built once from the command line and never changed afterwards.
use crate::{
    cli::{self, Cli},
    Result,
};
use clap::Parser as _;
use std::{
    env,
    ffi::OsString,
    iter,
    path::{Path, PathBuf},
};

/// The time, in seconds, thumbnails are taken at unless `-t` says otherwise.
pub const DEFAULT_TIMESTAMP: f64 = 1.5;

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    recursive: bool,
    timestamp: f64,
    dual_thumbnail: bool,
    verbose: bool,
    input: Vec<PathBuf>,
    ignored: Vec<OsString>,
}

impl Settings {
    /// Loads the settings from the process arguments.
    pub fn load() -> Result<Self> {
        Self::load_from(env::args_os())
    }

    /// Loads the settings from `args`, the first of which is the binary name.
    pub fn load_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut args = args.into_iter().map(Into::into);
        let bin_name = args
            .next()
            .unwrap_or_else(|| OsString::from(env!("CARGO_PKG_NAME")));
        let normalized = cli::normalize_args(args);
        let cli = Cli::try_parse_from(iter::once(bin_name).chain(normalized.args))?;
        let mut settings = Self::from(cli);
        settings.ignored = normalized.ignored;
        Ok(settings)
    }

    pub fn recursive(&self) -> bool {
        self.recursive
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn dual_thumbnail(&self) -> bool {
        self.dual_thumbnail
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn input(&self) -> &[PathBuf] {
        &self.input
    }

    /// The timestamps to capture for every video, in the order they should be captured.
    pub fn timestamps(&self) -> Vec<f64> {
        if self.dual_thumbnail {
            vec![DEFAULT_TIMESTAMP, self.timestamp]
        } else {
            vec![self.timestamp]
        }
    }

    /// Command line tokens that were dropped while parsing.
    pub fn ignored(&self) -> &[OsString] {
        &self.ignored
    }

    /// Logs the tokens that were dropped while parsing. Has to wait until the logger is set up.
    pub fn log_ignored(&self) {
        for token in &self.ignored {
            if token == cli::TIME_FLAG {
                log::debug!("Ignoring {} without a numeric value.", cli::TIME_FLAG);
            } else {
                log::debug!("Ignoring unknown flag {}.", token.to_string_lossy());
            }
        }
    }

    /// Where a recursive scan starts.
    pub fn scan_root() -> &'static Path {
        Path::new(".")
    }
}

impl From<Cli> for Settings {
    fn from(cli: Cli) -> Self {
        let timestamp = cli.time.unwrap_or(DEFAULT_TIMESTAMP);
        // A second thumbnail at the default time would just duplicate the first.
        let dual_thumbnail = cli.two_thumbnails && timestamp != DEFAULT_TIMESTAMP;
        Self {
            recursive: cli.recursive,
            timestamp,
            dual_thumbnail,
            verbose: cli.verbose,
            input: cli.input,
            ignored: Vec::new(),
        }
    }
}
