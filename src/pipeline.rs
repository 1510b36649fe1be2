//! End-to-end run: path preparation followed by the five stages.
//!
//! [`run`] wires the production services ([`RustDecoder`], [`SystemDisks`]).
//! [`run_with_services`] takes them as parameters so tests can substitute a
//! mock decoder and a fixed free-space probe.
//!
//! Stages run strictly in order and the first systemic error ends the run.
//! Duplicate sets are reported before planning, so a run that later fails
//! still shows what it found.

use crate::archive::{self, ArchiveError};
use crate::config::CleanerConfig;
use crate::disk::{SpaceProbe, SystemDisks};
use crate::events::{PipelineEvent, Stage, emit};
use crate::grouping::{self, GroupError};
use crate::imaging::{HistogramDecoder, RustDecoder};
use crate::inventory::{self, InventoryError};
use crate::paths::{self, PathError};
use crate::plan::{self, PlanError};
use crate::signature::{self, SignatureError};
use std::path::Path;
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Paths(#[from] PathError),
    #[error(transparent)]
    Inventory(#[from] InventoryError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error(transparent)]
    Plan(#[from] PlanError),
    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub images_found: usize,
    /// Files that could not be decoded.
    pub skipped: usize,
    pub duplicate_sets: usize,
    /// Files dropped because another member of their set was kept.
    pub duplicates: usize,
    pub copied: usize,
}

/// Run the pipeline with the production decoder and free-space probe.
pub fn run(
    input: &Path,
    output: &Path,
    config: &CleanerConfig,
    events: Option<Sender<PipelineEvent>>,
) -> Result<RunSummary, PipelineError> {
    run_with_services(
        &RustDecoder::new(),
        &SystemDisks,
        input,
        output,
        config,
        events.as_ref(),
    )
}

pub fn run_with_services(
    decoder: &impl HistogramDecoder,
    probe: &impl SpaceProbe,
    input: &Path,
    output: &Path,
    config: &CleanerConfig,
    events: Option<&Sender<PipelineEvent>>,
) -> Result<RunSummary, PipelineError> {
    paths::prepare_paths(input, output, config.output.clear_existing)?;

    emit(events, PipelineEvent::StageStarted(Stage::Inventory));
    let inventory = inventory::build_inventory(
        input,
        output,
        config.archive.timestamp,
        probe,
        events,
    )?;
    let images_found = inventory.records.len();

    emit(events, PipelineEvent::StageStarted(Stage::Signatures));
    let report = signature::compute_signatures(decoder, inventory.records, events)?;
    let skipped = report.skipped.len();

    emit(events, PipelineEvent::StageStarted(Stage::Grouping));
    let groups = grouping::group(&report.signed);
    for set in groups.iter().filter(|g| g.has_duplicates()) {
        emit(
            events,
            PipelineEvent::DuplicateSet {
                signature: set.signature(),
                kept: set.representative().path.clone(),
                duplicates: set.duplicates().iter().map(|r| r.path.clone()).collect(),
            },
        );
    }
    let selection = grouping::select(groups)?;
    let duplicate_sets = selection.duplicate_sets.len();
    let duplicates = selection.duplicate_count();

    emit(events, PipelineEvent::StageStarted(Stage::Planning));
    let plan = plan::build_plan(selection.representatives)?;
    emit(
        events,
        PipelineEvent::PlanReady {
            images: plan.image_count(),
            buckets: plan.bucket_count(),
        },
    );

    emit(events, PipelineEvent::StageStarted(Stage::Copying));
    let archived = archive::copy_plan(&plan, output, events)?;

    Ok(RunSummary {
        images_found,
        skipped,
        duplicate_sets,
        duplicates,
        copied: archived.copied.len(),
    })
}
