//! The command line surface.
//!
//! Parsing is forgiving: unknown flags are dropped, and a `-t` that isn't followed by
//! a usable number is ignored rather than reported. [`normalize_args`] strips those tokens before
//! the remainder is handed to clap, and keeps them so they can be logged once logging is up.
use crate::files;
use clap::{ArgAction, CommandFactory as _, Parser};
use std::{collections::HashSet, ffi::OsString, iter::Peekable, path::PathBuf};

/// The flag that takes a timestamp.
pub const TIME_FLAG: &str = "-t";

#[derive(Debug, Parser, Clone)]
#[command(
    name = env!("CARGO_PKG_NAME"),
    version,
    author,
    about,
    help_template = "{before-help}{name} {version}\n{about-with-newline}\n{usage-heading} {usage}\n\n{all-args}{after-help}",
    args_override_self = true,
    disable_help_flag = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Process all .mp4 files in the current directory, recursively.
    #[arg(short = 'B')]
    pub recursive: bool,
    /// Extract the frame at a specific time, in seconds (default: 1.5s).
    #[arg(short = 't', value_name = "TIME", allow_negative_numbers = true)]
    pub time: Option<f64>,
    /// Generate two thumbnails: one at 1.5s and one at the time given with -t.
    #[arg(short = '2')]
    pub two_thumbnails: bool,
    /// Log what is being run.
    #[arg(short, long)]
    pub verbose: bool,
    /// Display this help.
    #[arg(short, long, action = ArgAction::Help)]
    help: Option<bool>,
    #[arg(value_name = "VIDEO")]
    pub input: Vec<PathBuf>,
}

/// Every flag spelling clap knows about, e.g. `-B` and `--verbose`.
fn known_flags() -> HashSet<String> {
    let cmd = Cli::command();
    let mut flags: HashSet<String> = cmd
        .get_arguments()
        .flat_map(|arg| {
            let short = arg.get_short().map(|c| format!("-{c}"));
            let long = arg.get_long().map(|l| format!("--{l}"));
            short.into_iter().chain(long)
        })
        .collect();
    // Added by clap when the command is built.
    flags.insert(String::from("-V"));
    flags.insert(String::from("--version"));
    flags
}

/// A token clap doesn't know that starts with `-`. Tokens naming a video, like `-clip.mp4`, are
/// file names rather than flags.
fn is_unknown_flag(token: &OsString, known: &HashSet<String>) -> bool {
    token
        .to_str()
        .map(|t| t.len() > 1 && t.starts_with('-') && !known.contains(t) && !files::is_video(t))
        .unwrap_or(false)
}

fn is_positional(token: &OsString, known: &HashSet<String>) -> bool {
    !token
        .to_str()
        .map(|t| known.contains(t))
        .unwrap_or(false)
}

/// Parses a timestamp the way `-t` accepts it: any finite decimal number.
pub fn parse_time(token: &OsString) -> Option<f64> {
    token
        .to_str()
        .and_then(|t| t.parse::<f64>().ok())
        .filter(|t| t.is_finite())
}

fn take_time_value<I>(tokens: &mut Peekable<I>) -> Option<OsString>
where
    I: Iterator<Item = OsString>,
{
    if tokens.peek().and_then(parse_time).is_some() {
        tokens.next()
    } else {
        None
    }
}

/// The result of [`normalize_args`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedArgs {
    /// What clap gets to parse. Positional tokens come last, after a `--`.
    pub args: Vec<OsString>,
    /// Tokens that were dropped, in the order they appeared.
    pub ignored: Vec<OsString>,
}

/// Removes the tokens clap would otherwise reject: flags it doesn't know and `-t` flags without a
/// numeric value. Every other token that isn't a known flag is moved behind a `--`, so names
/// starting with `-` reach the video filter. Everything after a user-supplied `--` is positional.
pub fn normalize_args<I, T>(args: I) -> NormalizedArgs
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let known = known_flags();
    let mut tokens = args.into_iter().map(Into::into).peekable();
    let mut normalized = NormalizedArgs::default();
    let mut positional = Vec::new();
    while let Some(token) = tokens.next() {
        if token == "--" {
            positional.extend(tokens.by_ref());
            break;
        }
        if token == TIME_FLAG {
            match take_time_value(&mut tokens) {
                Some(value) => {
                    normalized.args.push(token);
                    normalized.args.push(value);
                }
                None => normalized.ignored.push(token),
            }
        } else if is_unknown_flag(&token, &known) {
            normalized.ignored.push(token);
        } else if is_positional(&token, &known) {
            positional.push(token);
        } else {
            normalized.args.push(token);
        }
    }
    if !positional.is_empty() {
        normalized.args.push(OsString::from("--"));
        normalized.args.extend(positional);
    }
    normalized
}
