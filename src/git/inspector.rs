//! Repository metadata for versioning and changelogs.
//!
//! Every query falls back to [`UNKNOWN`] instead of failing: unavailable
//! history metadata must never stop a release.

use super::operations::{
    LATEST_TAG_ARGS, SHORT_REVISION_ARGS, VersionControlQuery, previous_tag_args,
};
use std::sync::Arc;

/// Sentinel returned when a version-control query fails
pub const UNKNOWN: &str = "Unknown";

/// Latest tag and the tag that precedes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagPair {
    /// Most recent reachable tag
    pub latest: String,
    /// Most recent tag strictly older than `latest`
    pub previous: String,
}

/// Read-only view of repository history
#[derive(Clone)]
pub struct GitInspector {
    query: Arc<dyn VersionControlQuery>,
}

impl std::fmt::Debug for GitInspector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitInspector").finish_non_exhaustive()
    }
}

impl GitInspector {
    /// Create an inspector over a query capability
    pub fn new(query: impl VersionControlQuery + 'static) -> Self {
        Self {
            query: Arc::new(query),
        }
    }

    /// Create an inspector sharing an existing capability
    pub fn from_shared(query: Arc<dyn VersionControlQuery>) -> Self {
        Self { query }
    }

    /// Short id of the checked-out revision, or `Unknown`
    pub fn latest_commit_short(&self) -> String {
        self.ask("current revision", SHORT_REVISION_ARGS)
    }

    /// Most recent reachable tag, or `Unknown`
    pub fn latest_tag(&self) -> String {
        self.ask("latest tag", LATEST_TAG_ARGS)
    }

    /// Most recent tag older than [`GitInspector::latest_tag`], or `Unknown`
    pub fn previous_tag(&self) -> String {
        let latest = self.latest_tag();
        self.previous_tag_before(&latest)
    }

    /// Both tags, resolved latest-first
    pub fn tag_pair(&self) -> TagPair {
        let latest = self.latest_tag();
        let previous = self.previous_tag_before(&latest);
        TagPair { latest, previous }
    }

    fn previous_tag_before(&self, latest: &str) -> String {
        // No tags at all: there is nothing to exclude
        if latest == UNKNOWN {
            return UNKNOWN.to_string();
        }

        let args = previous_tag_args(latest);
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        let previous = self.ask("previous tag", &args);

        if previous == latest {
            log::warn!("Exclusion query returned the excluded tag '{}'", latest);
            return UNKNOWN.to_string();
        }
        previous
    }

    fn ask(&self, what: &str, args: &[&str]) -> String {
        match self.query.query(args) {
            Ok(answer) => answer,
            Err(e) => {
                log::warn!("Could not resolve {}: {}", what, e);
                UNKNOWN.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{ScriptedQuery, ScriptedResponse};

    const EXCLUDE_V2: &[&str] = &["describe", "--tags", "--abbrev=0", "--exclude", "v2.0.0"];

    fn tagged_repo() -> ScriptedQuery {
        ScriptedQuery::new()
            .output(SHORT_REVISION_ARGS, "a1b2c3d\n")
            .output(LATEST_TAG_ARGS, "v2.0.0\n")
            .output(EXCLUDE_V2, "v1.9.0\n")
    }

    #[test]
    fn test_queries_resolve() {
        let inspector = GitInspector::new(tagged_repo());
        assert_eq!(inspector.latest_commit_short(), "a1b2c3d");
        assert_eq!(inspector.latest_tag(), "v2.0.0");
        assert_eq!(inspector.previous_tag(), "v1.9.0");
    }

    #[test]
    fn test_previous_tag_queries_latest_first() {
        let query = Arc::new(tagged_repo());
        let inspector = GitInspector::from_shared(query.clone());
        inspector.previous_tag();
        assert_eq!(
            query.calls(),
            vec![LATEST_TAG_ARGS.join(" "), EXCLUDE_V2.join(" ")]
        );
    }

    #[test]
    fn test_previous_differs_from_latest() {
        let pair = GitInspector::new(tagged_repo()).tag_pair();
        assert_ne!(pair.latest, pair.previous);
    }

    #[test]
    fn test_failures_map_to_sentinel() {
        for response in [
            ScriptedResponse::Exit(128),
            ScriptedResponse::Timeout,
            ScriptedResponse::Missing,
        ] {
            let query = ScriptedQuery::new()
                .on(SHORT_REVISION_ARGS, response.clone())
                .on(LATEST_TAG_ARGS, response.clone())
                .on(EXCLUDE_V2, response);
            let inspector = GitInspector::new(query);
            assert_eq!(inspector.latest_commit_short(), UNKNOWN);
            assert_eq!(inspector.latest_tag(), UNKNOWN);
            assert_eq!(inspector.previous_tag(), UNKNOWN);
        }
    }

    #[test]
    fn test_zero_tags_skips_exclusion_query() {
        let query = Arc::new(ScriptedQuery::new().on(LATEST_TAG_ARGS, ScriptedResponse::Exit(128)));
        let inspector = GitInspector::from_shared(query.clone());
        assert_eq!(inspector.previous_tag(), UNKNOWN);
        assert_eq!(query.calls().len(), 1);
    }

    #[test]
    fn test_single_tag_has_no_previous() {
        let query = ScriptedQuery::new()
            .output(LATEST_TAG_ARGS, "v2.0.0")
            .on(EXCLUDE_V2, ScriptedResponse::Exit(128));
        let pair = GitInspector::new(query).tag_pair();
        assert_eq!(pair.latest, "v2.0.0");
        assert_eq!(pair.previous, UNKNOWN);
    }

    #[test]
    fn test_echoed_exclusion_is_rejected() {
        let query = ScriptedQuery::new()
            .output(LATEST_TAG_ARGS, "v2.0.0")
            .output(EXCLUDE_V2, "v2.0.0");
        assert_eq!(GitInspector::new(query).previous_tag(), UNKNOWN);
    }
}
