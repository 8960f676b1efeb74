use clap::Error as ClapError;
use eyre::Report as ReportError;
use globset::Error as GlobError;
use log::SetLoggerError;
use snafu::Snafu;
use std::{ffi::OsString, io::Error as IoError};

#[derive(Snafu, Debug)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(transparent)]
    Io { source: IoError },
    #[snafu(transparent)]
    SetLogger { source: SetLoggerError },
    #[snafu(transparent)]
    Glob { source: GlobError },
    #[snafu(display("Could not run {}: {source}", program.to_string_lossy()))]
    Spawn { program: OsString, source: IoError },
    #[snafu(transparent)]
    Report { source: ReportError },
    #[snafu(transparent)]
    Clap { source: ClapError },
}

pub type Result<V> = std::result::Result<V, Error>;
