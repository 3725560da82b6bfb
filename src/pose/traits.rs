// src/pose/traits.rs
//! Seam for the external pose-estimation collaborator

use crate::pose::types::PoseSnapshot;
use std::error::Error;

/// A producer of per-frame pose snapshots.
///
/// Implementations wrap a pose model, a recording, or the simulator. The
/// analysis core never calls a source itself; drivers pull frames and feed
/// them to [`crate::analysis::FrameAnalyzer`] one at a time.
pub trait PoseSource {
    type Error: Error + Send + Sync + 'static;

    /// Next frame's pose. `Ok(None)` means the frame had no detected body;
    /// end of stream is reported through [`PoseSource::is_exhausted`].
    fn next_pose(&mut self) -> Result<Option<PoseSnapshot>, Self::Error>;

    /// Whether the source has no more frames to give
    fn is_exhausted(&self) -> bool;

    /// Human readable description for logs
    fn describe(&self) -> String;
}
