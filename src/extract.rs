//! Grabbing a single frame out of a video with an external tool.
use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use snafu::ResultExt as _;

use crate::{
    error::SpawnSnafu,
    files::{get_filename, unique_output_path},
    settings::DEFAULT_TIMESTAMP,
    util::ENV,
    Result,
};

/// The `-q:v` value handed to ffmpeg. Lower is better; 2 is near the top of the JPEG scale.
pub const JPEG_QUALITY: &str = "2";

/// The text added to a thumbnail's file name for a capture at `timestamp`. Captures at the default
/// time get no label, everything else gets the whole seconds, e.g. `(7s)` for 7.9.
pub fn suffix_label(timestamp: f64) -> String {
    if timestamp == DEFAULT_TIMESTAMP {
        return String::new();
    }
    let whole = timestamp.trunc();
    // Keeps -0.5 from coming out as `(-0s)`.
    let whole = if whole == 0.0 { 0.0 } else { whole };
    format!("({:.0}s)", whole)
}

/// Seconds as handed to ffmpeg and shown to the user. Always has a decimal point or an exponent,
/// e.g. `7.0`, `7.9` or `1e300`.
pub fn format_seconds(timestamp: f64) -> String {
    format!("{:?}", timestamp)
}

/// One frame to pull out of one video.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionRequest {
    video: PathBuf,
    timestamp: f64,
    suffix_label: String,
}

impl ExtractionRequest {
    pub fn new<P: Into<PathBuf>>(video: P, timestamp: f64) -> Self {
        Self {
            video: video.into(),
            timestamp,
            suffix_label: suffix_label(timestamp),
        }
    }

    pub fn video(&self) -> &Path {
        &self.video
    }

    pub fn timestamp(&self) -> f64 {
        self.timestamp
    }

    pub fn suffix_label(&self) -> &str {
        &self.suffix_label
    }

    /// A free path next to the video to write the thumbnail to.
    pub fn output_path(&self) -> PathBuf {
        unique_output_path(self.video.with_extension(""), &self.suffix_label)
    }
}

/// What a run of the capture tool produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureOutput {
    pub success: bool,
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Something that can write the frame at `timestamp` of `video` to `output`.
pub trait FrameCapture {
    /// Runs the capture to completion. An `Err` means the capture couldn't be attempted at all;
    /// a capture that ran and failed is reported through [`CaptureOutput::success`].
    fn capture(&self, video: &Path, timestamp: f64, output: &Path) -> Result<CaptureOutput>;
}

/// Captures frames by running ffmpeg.
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    program: OsString,
    log_level: Option<String>,
}

impl Ffmpeg {
    pub fn new<S: Into<OsString>>(program: S) -> Self {
        Self {
            program: program.into(),
            log_level: None,
        }
    }

    /// Uses `MK_THUMBS_FFMPEG` and `FFMPEG_LOG_LEVEL`, if they're set.
    pub fn from_env() -> Self {
        Self {
            program: ENV.ffmpeg_binary().clone(),
            log_level: ENV.ffmpeg_log_level().map(String::from),
        }
    }

    pub fn with_log_level<S: Into<String>>(mut self, level: S) -> Self {
        self.log_level = Some(level.into());
        self
    }

    pub fn program(&self) -> &OsString {
        &self.program
    }

    pub fn command_args(&self, video: &Path, timestamp: f64, output: &Path) -> Vec<OsString> {
        let mut args = vec![
            OsString::from("-ss"),
            OsString::from(format_seconds(timestamp)),
            OsString::from("-i"),
            OsString::from(video),
            OsString::from("-frames:v"),
            OsString::from("1"),
            OsString::from("-q:v"),
            OsString::from(JPEG_QUALITY),
            OsString::from(output),
        ];
        if let Some(level) = &self.log_level {
            args.splice(0..0, [OsString::from("-loglevel"), OsString::from(level)]);
        }
        args
    }
}

impl Default for Ffmpeg {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FrameCapture for Ffmpeg {
    fn capture(&self, video: &Path, timestamp: f64, output: &Path) -> Result<CaptureOutput> {
        let args = self.command_args(video, timestamp, output);
        log::debug!(
            "Running {} {}",
            self.program.to_string_lossy(),
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        let result = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .output()
            .context(SpawnSnafu {
                program: self.program.clone(),
            })?;
        Ok(CaptureOutput {
            success: result.status.success(),
            code: result.status.code(),
            stdout: String::from_utf8_lossy(&result.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        })
    }
}

/// How a single extraction went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Created { output: PathBuf },
    Missing,
    Failed { stderr: String },
}

/// Writes the thumbnail described by `request`, reporting the outcome on stdout. A missing video
/// or a failed capture is not an error; only failing to run the capture tool at all is.
pub fn extract_frame<C>(capture: &C, request: &ExtractionRequest) -> Result<Extraction>
where
    C: FrameCapture + ?Sized,
{
    let video = request.video();
    if !video.exists() {
        println!("[!] File not found: {}", video.display());
        return Ok(Extraction::Missing);
    }
    let output = request.output_path();
    let result = capture.capture(video, request.timestamp(), &output)?;
    if result.success {
        println!(
            "[✓] {} → {} @ {}s",
            get_filename(&video),
            get_filename(&output),
            format_seconds(request.timestamp())
        );
        Ok(Extraction::Created { output })
    } else {
        log::debug!(
            "Capture of {} exited with {:?}",
            video.display(),
            result.code
        );
        println!(
            "[✗] Failed to extract frame @ {}s from: {}",
            format_seconds(request.timestamp()),
            get_filename(&video)
        );
        println!("[ERROR] FFmpeg Error: {}", result.stderr);
        Ok(Extraction::Failed {
            stderr: result.stderr,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::{cell::RefCell, fs::File};
    use tempfile::TempDir;

    /// Records every capture and writes an empty output file, or fails with `stderr` if set.
    #[derive(Default)]
    pub(crate) struct FakeCapture {
        pub calls: RefCell<Vec<(PathBuf, f64, PathBuf)>>,
        pub stderr: Option<String>,
    }

    impl FakeCapture {
        pub fn failing(stderr: &str) -> Self {
            Self {
                stderr: Some(String::from(stderr)),
                ..Self::default()
            }
        }
    }

    impl FrameCapture for FakeCapture {
        fn capture(&self, video: &Path, timestamp: f64, output: &Path) -> Result<CaptureOutput> {
            self.calls
                .borrow_mut()
                .push((video.to_path_buf(), timestamp, output.to_path_buf()));
            match &self.stderr {
                Some(stderr) => Ok(CaptureOutput {
                    success: false,
                    code: Some(1),
                    stderr: stderr.clone(),
                    ..CaptureOutput::default()
                }),
                None => {
                    File::create(output)?;
                    Ok(CaptureOutput {
                        success: true,
                        code: Some(0),
                        ..CaptureOutput::default()
                    })
                }
            }
        }
    }

    #[test]
    fn test_suffix_label() {
        assert_eq!(suffix_label(1.5), "");
        assert_eq!(suffix_label(7.9), "(7s)");
        assert_eq!(suffix_label(10.0), "(10s)");
        assert_eq!(suffix_label(0.4), "(0s)");
        assert_eq!(suffix_label(1.49), "(1s)");
        assert_eq!(suffix_label(-2.5), "(-2s)");
        assert_eq!(suffix_label(-0.5), "(0s)");
    }

    #[test]
    fn test_suffix_label_does_not_saturate() {
        let label = suffix_label(1e300);
        assert_eq!(label.len(), "(s)".len() + 301);
        assert!(label.starts_with("(1000000000000000052504760255204420248704"));
        assert!(label.ends_with("s)"));
        assert_eq!(suffix_label(1e19), "(10000000000000000000s)");
    }

    #[test]
    fn test_format_seconds() {
        assert_eq!(format_seconds(1.5), "1.5");
        assert_eq!(format_seconds(7.0), "7.0");
        assert_eq!(format_seconds(1e300), "1e300");
    }

    #[test]
    fn test_output_path_strips_extension() {
        let dir = TempDir::new().unwrap();
        let request = ExtractionRequest::new(dir.path().join("my.movie.mkv"), 7.9);
        assert_eq!(request.suffix_label(), "(7s)");
        assert_eq!(request.output_path(), dir.path().join("my.movie(7s).jpg"));
    }

    #[test]
    fn test_ffmpeg_command_args() {
        let ffmpeg = Ffmpeg::default();
        let args = ffmpeg.command_args(Path::new("in.mp4"), 7.9, Path::new("in(7s).jpg"));
        assert_eq!(
            args,
            ["-ss", "7.9", "-i", "in.mp4", "-frames:v", "1", "-q:v", "2", "in(7s).jpg"]
                .map(OsString::from)
        );
        let args = ffmpeg
            .with_log_level("error")
            .command_args(Path::new("in.mp4"), 1.5, Path::new("in.jpg"));
        assert_eq!(
            args,
            ["-loglevel", "error", "-ss", "1.5", "-i", "in.mp4", "-frames:v", "1", "-q:v", "2", "in.jpg"]
                .map(OsString::from)
        );
    }

    #[test]
    fn test_extract_frame_missing_video() {
        let dir = TempDir::new().unwrap();
        let capture = FakeCapture::default();
        let request = ExtractionRequest::new(dir.path().join("gone.mp4"), 1.5);
        assert_eq!(extract_frame(&capture, &request).unwrap(), Extraction::Missing);
        assert!(capture.calls.borrow().is_empty());
        assert!(!dir.path().join("gone.jpg").exists());
    }

    #[test]
    fn test_extract_frame_creates_thumbnail() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("movie.mp4");
        File::create(&video).unwrap();
        File::create(dir.path().join("movie.jpg")).unwrap();
        let capture = FakeCapture::default();
        let result = extract_frame(&capture, &ExtractionRequest::new(&video, 1.5)).unwrap();
        let expected = dir.path().join("movie_01.jpg");
        assert_eq!(
            result,
            Extraction::Created {
                output: expected.clone()
            }
        );
        assert!(expected.exists());
        assert_eq!(*capture.calls.borrow(), vec![(video, 1.5, expected)]);
    }

    #[test]
    fn test_extract_frame_failure_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("broken.avi");
        File::create(&video).unwrap();
        let capture = FakeCapture::failing("moov atom not found");
        let result = extract_frame(&capture, &ExtractionRequest::new(&video, 3.0)).unwrap();
        assert_eq!(
            result,
            Extraction::Failed {
                stderr: String::from("moov atom not found")
            }
        );
        assert!(!dir.path().join("broken(3s).jpg").exists());
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let dir = TempDir::new().unwrap();
        let video = dir.path().join("movie.mp4");
        File::create(&video).unwrap();
        let ffmpeg = Ffmpeg::new(dir.path().join("no-such-ffmpeg"));
        let err = extract_frame(&ffmpeg, &ExtractionRequest::new(&video, 1.5)).unwrap_err();
        assert!(matches!(err, crate::Error::Spawn { .. }));
    }
}
