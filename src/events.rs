//! Progress and diagnostic events emitted by the pipeline stages.
//!
//! Stages never print. They push events into an optional channel and the CLI
//! turns them into lines with [`crate::output::format_event`].

use crate::types::Signature;
use std::path::PathBuf;
use std::sync::mpsc::Sender;

/// Pipeline stage, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Inventory,
    Signatures,
    Grouping,
    Planning,
    Copying,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    StageStarted(Stage),
    ImagesFound {
        count: usize,
    },
    SpaceChecked {
        required: u64,
        available: u64,
    },
    SignatureComputed {
        completed: usize,
        total: usize,
        path: PathBuf,
    },
    DecodeSkipped {
        completed: usize,
        total: usize,
        path: PathBuf,
        reason: String,
    },
    /// A group with more than one member; reported before anything is copied.
    DuplicateSet {
        signature: Signature,
        kept: PathBuf,
        duplicates: Vec<PathBuf>,
    },
    PlanReady {
        images: usize,
        buckets: usize,
    },
    FileCopied {
        completed: usize,
        total: usize,
        source: PathBuf,
        destination: PathBuf,
    },
}

/// Send `event` if a listener is attached. A dropped receiver is not an error.
pub(crate) fn emit(events: Option<&Sender<PipelineEvent>>, event: PipelineEvent) {
    if let Some(tx) = events {
        tx.send(event).ok();
    }
}
