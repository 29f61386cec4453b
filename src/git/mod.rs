//! Version-control introspection for release workflows.
//!
//! This module queries the repository through an external `git` process with
//! a bounded timeout, and exposes the results through [`GitInspector`], which
//! substitutes the `Unknown` sentinel for any failure.

mod inspector;
mod operations;
mod runner;

pub use inspector::{GitInspector, TagPair, UNKNOWN};
pub use operations::{
    LATEST_TAG_ARGS, SHORT_REVISION_ARGS, ScriptedQuery, ScriptedResponse, VersionControlQuery,
    previous_tag_args,
};
pub use runner::{DEFAULT_QUERY_TIMEOUT, ProcessRunner};
