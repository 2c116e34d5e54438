use std::path::PathBuf;

use anyhow::Context;

use crate::encode::{EXPORT_QUALITY, artifact_file_name, encode_jpeg};
use crate::error::{HoesgenError, HoesgenResult};
use crate::model::ProjectState;
use crate::render::Renderer;

/// Destination for exported artifacts.
///
/// Ordering contract: `emit` is called strictly in record input order, one
/// artifact at a time; the sequencer never interleaves emits.
pub trait ArtifactSink {
    /// Deliver one encoded artifact under its deterministic file name.
    fn emit(&mut self, name: &str, bytes: &[u8]) -> HoesgenResult<()>;
}

/// Sink that writes artifacts into a directory.
#[derive(Debug)]
pub struct DirectorySink {
    root: PathBuf,
}

impl DirectorySink {
    /// Create a sink rooted at `root`, creating the directory if needed.
    pub fn new(root: impl Into<PathBuf>) -> HoesgenResult<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("create output dir '{}'", root.display()))?;
        Ok(Self { root })
    }
}

impl ArtifactSink for DirectorySink {
    fn emit(&mut self, name: &str, bytes: &[u8]) -> HoesgenResult<()> {
        let path = self.root.join(name);
        std::fs::write(&path, bytes)
            .with_context(|| format!("write artifact '{}'", path.display()))?;
        Ok(())
    }
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct MemorySink {
    /// Emitted artifacts in emit order.
    pub artifacts: Vec<(String, Vec<u8>)>,
}

impl MemorySink {
    /// Create an empty in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ArtifactSink for MemorySink {
    fn emit(&mut self, name: &str, bytes: &[u8]) -> HoesgenResult<()> {
        self.artifacts.push((name.to_string(), bytes.to_vec()));
        Ok(())
    }
}

/// Aggregated counters for one batch export.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExportStats {
    /// Records the batch was asked to export.
    pub requested: u64,
    /// Artifacts successfully emitted.
    pub exported: u64,
    /// Records whose render/encode/emit failed and were skipped.
    pub failed: u64,
}

/// Export one artifact per record, strictly in input order.
///
/// Preconditions (checked up front, nothing exported on failure):
/// - no export may already be in flight (`state.exporting`);
/// - at least one parsed record must exist;
/// - a source image must be loaded.
///
/// Each iteration switches the active record, renders it to completion, then
/// encodes and emits. The frame returned by [`Renderer::render`] is the
/// render-completion signal the encode step consumes, so switch, render and
/// encode can never race; iterations share one canvas and are never
/// concurrent. A per-record failure is logged and counted, and the loop moves
/// on: partial success is expected behavior, not an error state.
pub fn export_all(
    state: &mut ProjectState,
    renderer: &mut Renderer,
    sink: &mut dyn ArtifactSink,
) -> HoesgenResult<ExportStats> {
    if state.exporting {
        return Err(HoesgenError::validation("an export is already in progress"));
    }
    if state.records.is_empty() {
        return Err(HoesgenError::validation(
            "no parsed dimension records to export",
        ));
    }
    if state.image.is_none() {
        return Err(HoesgenError::validation(
            "a source image must be loaded before exporting",
        ));
    }

    state.exporting = true;
    let mut stats = ExportStats {
        requested: state.records.len() as u64,
        ..ExportStats::default()
    };

    for index in 0..state.records.len() {
        state.active = index;
        let name = artifact_file_name(&state.records[index]);

        let emitted = renderer
            .render(state)
            .and_then(|frame| encode_jpeg(&frame, EXPORT_QUALITY))
            .and_then(|bytes| sink.emit(&name, &bytes));

        match emitted {
            Ok(()) => {
                tracing::debug!(artifact = %name, index, "exported artifact");
                stats.exported += 1;
            }
            Err(err) => {
                tracing::warn!(artifact = %name, index, error = %err, "artifact export failed");
                stats.failed += 1;
            }
        }
    }

    state.exporting = false;
    tracing::info!(
        requested = stats.requested,
        exported = stats.exported,
        failed = stats.failed,
        "batch export finished"
    );
    Ok(stats)
}
