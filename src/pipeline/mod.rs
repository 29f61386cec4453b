//! Release orchestration.
//!
//! A release is a graph of named steps executed in dependency order against a
//! single [`ReleaseContext`].

mod context;
mod graph;

pub use context::{
    ReleaseContext, STEP_CHANGELOG, STEP_COLLECT, STEP_NOTIFY, STEP_PUBLISH, STEP_VERSION,
    release_graph, release_steps,
};
pub use graph::{PipelineReport, Step, StepGraph, StepReport, StepRunner, StepStatus};
