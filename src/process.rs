use crate::{
    extract::{self, Extraction, ExtractionRequest, FrameCapture},
    files,
    settings::Settings,
    util::ENV,
    Result,
};
use std::path::{Path, PathBuf};

/// Tallies of how a batch went.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub created: usize,
    pub missing: usize,
    pub failed: usize,
}

impl Summary {
    fn record(&mut self, extraction: &Extraction) {
        match extraction {
            Extraction::Created { .. } => self.created += 1,
            Extraction::Missing => self.missing += 1,
            Extraction::Failed { .. } => self.failed += 1,
        }
    }
}

/// Takes every thumbnail the settings ask for of a single video. In dual mode the default-time
/// thumbnail always comes first.
pub fn process_video<C, P>(capture: &C, settings: &Settings, path: &P) -> Result<Vec<Extraction>>
where
    C: FrameCapture + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let mut results = Vec::new();
    for timestamp in settings.timestamps() {
        let request = ExtractionRequest::new(path, timestamp);
        let extraction = extract::extract_frame(capture, &request)?;
        if let Extraction::Failed { stderr } = &extraction {
            log::error!("{} failed @ {}s", files::get_filename(&path), timestamp);
            if ENV.unwrap_errors() {
                panic!("{} failed: {}", path.display(), stderr);
            }
        }
        results.push(extraction);
    }
    Ok(results)
}

/// Processes the videos one after the other, in order. Missing files and failed captures are
/// reported and skipped.
pub fn process_videos<C>(
    capture: &C,
    settings: &Settings,
    video_files: Vec<PathBuf>,
) -> Result<Summary>
where
    C: FrameCapture + ?Sized,
{
    let mut summary = Summary::default();
    for path in &video_files {
        for extraction in process_video(capture, settings, path)? {
            summary.record(&extraction);
        }
    }
    log::info!(
        "{} thumbnail(s) created, {} failed, {} missing.",
        summary.created,
        summary.failed,
        summary.missing
    );
    Ok(summary)
}
