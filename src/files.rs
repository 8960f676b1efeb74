//! Items dealing with files.
use std::{
    borrow::Cow,
    ffi::OsString,
    path::{Path, PathBuf},
};

use globset::{GlobBuilder, GlobMatcher};
use walkdir::WalkDir;

use crate::{settings::Settings, Result};

/// Extensions, lowercase and without the dot, of files treated as videos.
pub const VIDEO_EXTENSIONS: [&str; 7] = ["mp4", "mkv", "avi", "mov", "flv", "webm", "mpg"];

/// The only file names a recursive scan picks up.
pub const RECURSIVE_PATTERN: &str = "*.mp4";

/// A convenience function to get the file name from a path as a string. Falls back to the whole
/// path if it has no file name.
pub fn get_filename<P: AsRef<Path>>(path: &P) -> Cow<'_, str> {
    let path = path.as_ref();
    path.file_name()
        .map(|name| name.to_string_lossy())
        .unwrap_or_else(|| path.to_string_lossy())
}

/// Whether the path has one of the [`VIDEO_EXTENSIONS`], ignoring case.
pub fn is_video<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Returns a `.jpg` path built from `base` and `suffix` that doesn't exist yet. If
/// `<base><suffix>.jpg` is taken, `_01`, `_02`, ... are appended until a free name turns up.
pub fn unique_output_path<P: AsRef<Path>>(base: P, suffix: &str) -> PathBuf {
    let base = base.as_ref();
    let candidate = |counter: Option<usize>| {
        let mut name = OsString::from(base.file_name().unwrap_or_default());
        name.push(suffix);
        if let Some(counter) = counter {
            name.push(format!("_{:02}", counter));
        }
        name.push(".jpg");
        base.with_file_name(name)
    };
    let mut output = candidate(None);
    let mut counter = 1;
    while output.exists() {
        output = candidate(Some(counter));
        counter += 1;
    }
    output
}

fn recursive_matcher() -> Result<GlobMatcher> {
    Ok(GlobBuilder::new(RECURSIVE_PATTERN)
        .literal_separator(true)
        .build()?
        .compile_matcher())
}

/// Finds every file under `root` whose name matches [`RECURSIVE_PATTERN`], sorted by name within
/// each directory. A leading `./` is stripped from the results.
pub fn find_videos_recursive<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>> {
    let matcher = recursive_matcher()?;
    let mut videos = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!(
                    "Skipping {}: {}",
                    e.path().unwrap_or(Path::new("?")).display(),
                    e
                );
                continue;
            }
        };
        if matcher.is_match(entry.file_name()) && entry.path().is_file() {
            let path = entry.into_path();
            let relative = path.strip_prefix(".").map(Path::to_path_buf).ok();
            videos.push(relative.unwrap_or(path));
        }
    }
    Ok(videos)
}

/// Collects the videos to take thumbnails of, in the order they should be processed.
pub fn get_video_files_to_process(settings: &Settings) -> Result<Vec<PathBuf>> {
    let candidates = if settings.recursive() {
        log::debug!(
            "Scanning {} for {}",
            Settings::scan_root().display(),
            RECURSIVE_PATTERN
        );
        find_videos_recursive(Settings::scan_root())?
    } else {
        settings.input().to_vec()
    };
    Ok(candidates
        .into_iter()
        .filter(|path| {
            let keep = is_video(path);
            if !keep {
                log::trace!("Skipping {}: not a video file", path.display());
            }
            keep
        })
        .collect())
}
