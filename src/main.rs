use clap::{error::ErrorKind, CommandFactory as _};
use mk_thumbs::{cli::Cli, extract::Ffmpeg, files, process, settings::Settings, Error, Result};
use std::env::{set_var, var_os as get_var};

#[cfg(all(debug_assertions, feature = "pretty-errors"))]
fn _init_pretty_errors() -> Result<()> {
    if let Err(std::env::VarError::NotPresent) = std::env::var("RUST_BACKTRACE") {
        color_backtrace::BacktracePrinter::new()
            .verbosity(color_backtrace::Verbosity::Full)
            .install(color_backtrace::default_output_stream())
    } else {
        color_backtrace::install();
    }
    color_eyre::install()?;
    Ok(())
}

#[cfg(all(not(debug_assertions), feature = "pretty-errors"))]
fn _init_pretty_errors() -> Result<()> {
    color_backtrace::install();
    color_eyre::install()?;
    Ok(())
}

#[cfg(not(feature = "pretty-errors"))]
fn _init_pretty_errors() -> Result<()> {
    Ok(())
}

fn init() -> Result<()> {
    dotenv::dotenv().ok();
    _init_pretty_errors()?;
    Ok(())
}

fn init_logging(settings: &Settings) -> Result<()> {
    if settings.verbose() {
        set_var("RUST_LOG", "mk_thumbs=debug");
    } else if get_var("RUST_LOG").is_none() {
        set_var("RUST_LOG", "mk_thumbs=info");
    }
    pretty_env_logger::try_init()?;
    Ok(())
}

fn run(settings: &Settings) -> Result<()> {
    settings.log_ignored();
    log::debug!("Settings: {:#?}", settings);
    let video_files = files::get_video_files_to_process(settings)?;
    let ffmpeg = Ffmpeg::from_env();
    process::process_videos(&ffmpeg, settings, video_files)?;
    Ok(())
}

fn main() -> Result<()> {
    init()?;
    match Settings::load() {
        Ok(settings) => {
            init_logging(&settings)?;
            run(&settings)
        }
        Err(Error::Clap { source: e }) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                e.print()?;
                Ok(())
            }
            ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                Cli::command().print_help()?;
                Ok(())
            }
            _ => Err(e.into()),
        },
        Err(error) => Err(error),
    }
}
