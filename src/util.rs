use std::{env, ffi::OsString, str::FromStr as _, sync::OnceLock};

lazy_static::lazy_static! {
    pub static ref ENV: EnvVars = EnvVars::default();
}

/// Log levels ffmpeg understands for `-loglevel`.
const FFMPEG_LOG_LEVELS: [&str; 9] = [
    "quiet", "panic", "fatal", "error", "warning", "info", "verbose", "debug", "trace",
];

/// Gets the value of the provided environment variable name and converts it to a boolean value. A
/// environment variable's value is considered `true` if it's value is a positive, non-zero integer.
pub fn envvar_to_bool(varname: &str) -> bool {
    match env::var(varname) {
        Err(_) => false,
        Ok(v) => {
            if let Ok(n) = usize::from_str(&v) {
                n != 0
            } else {
                false
            }
        }
    }
}

/// Checks a user-supplied ffmpeg log level, returning it normalized to lowercase.
pub fn parse_ffmpeg_log_level(level: &str) -> Option<String> {
    let level = level.trim().to_lowercase();
    if FFMPEG_LOG_LEVELS.contains(&level.as_str()) {
        Some(level)
    } else {
        None
    }
}

#[derive(Debug, Default)]
pub struct EnvVars {
    ffmpeg_binary: OnceLock<OsString>,
    ffmpeg_log_level: OnceLock<Option<String>>,
    unwrap_errors: OnceLock<bool>,
}

macro_rules! env_var_bool_getter {
    ($field:ident, $var_name:literal) => {
        pub fn $field(&self) -> bool {
            *self.$field.get_or_init(|| envvar_to_bool($var_name))
        }
    };
}

impl EnvVars {
    env_var_bool_getter! {unwrap_errors, "UNWRAP_ERRORS"}

    /// The frame-capture binary to run. Anything on `PATH` or an explicit path works.
    pub fn ffmpeg_binary(&self) -> &OsString {
        self.ffmpeg_binary.get_or_init(|| {
            env::var_os("MK_THUMBS_FFMPEG")
                .filter(|bin| !bin.is_empty())
                .unwrap_or_else(|| OsString::from("ffmpeg"))
        })
    }

    pub fn ffmpeg_log_level(&self) -> Option<&str> {
        self.ffmpeg_log_level
            .get_or_init(|| match env::var("FFMPEG_LOG_LEVEL") {
                Err(_) => None,
                Ok(level_str) => {
                    let level = parse_ffmpeg_log_level(&level_str);
                    if level.is_none() {
                        log::warn!("Unknown ffmpeg log level: {}", level_str);
                    }
                    level
                }
            })
            .as_deref()
    }
}
