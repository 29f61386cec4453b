//! Placeholder registration and template substitution.
//!
//! Templates reference placeholders as `{{key}}`. Each key maps to a resolver
//! that is evaluated lazily, at most once per key per [`PlaceholderRegistry::substitute`]
//! call, so repeated occurrences always render identically. Tokens without a
//! registered resolver are left untouched.
//!
//! A registry is built per pipeline invocation. Access is serialized through a
//! single mutex, and registering an existing key replaces its resolver
//! (last write wins).

use crate::git::GitInspector;
use crate::version::Version;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

/// Resolved version string
pub const VERSION: &str = "version";
/// Short id of the current revision
pub const COMMIT: &str = "commit";
/// Tag preceding the latest tag
pub const PREVIOUS_TAG: &str = "tags:previous";
/// Most recent tag
pub const LATEST_TAG: &str = "tags:latest";
/// Comparison link between the previous and latest tags (changelog only)
pub const HISTORY: &str = "tags:history";

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([^{}\s]+)\}\}").expect("placeholder token pattern is valid")
});

type Resolver = Arc<dyn Fn() -> String + Send + Sync>;

/// Mapping from placeholder key to resolver
#[derive(Default)]
pub struct PlaceholderRegistry {
    resolvers: Mutex<HashMap<String, Resolver>>,
}

impl std::fmt::Debug for PlaceholderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaceholderRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}

impl PlaceholderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the fixed release vocabulary:
    /// `version`, `commit`, `tags:previous` and `tags:latest`
    pub fn with_defaults(version: &Version, inspector: &GitInspector) -> Self {
        let registry = Self::new();

        let rendered = version.to_string();
        registry.register(VERSION, move || rendered.clone());

        let git = inspector.clone();
        registry.register(COMMIT, move || git.latest_commit_short());

        let git = inspector.clone();
        registry.register(PREVIOUS_TAG, move || git.previous_tag());

        let git = inspector.clone();
        registry.register(LATEST_TAG, move || git.latest_tag());

        registry
    }

    /// Register `resolver` under `key`, replacing any earlier resolver
    pub fn register<F>(&self, key: impl Into<String>, resolver: F)
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        let key = key.into();
        let mut resolvers = self.lock();
        if resolvers.insert(key.clone(), Arc::new(resolver)).is_some() {
            log::debug!("Placeholder '{}' re-registered, previous resolver replaced", key);
        }
    }

    /// Whether a resolver exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    /// Registered keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.lock().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Replace every registered `{{key}}` in `text`
    pub fn substitute(&self, text: &str) -> String {
        // Resolvers run outside the lock so they may use the registry themselves
        let resolvers = self.lock().clone();
        let mut resolved: HashMap<String, String> = HashMap::new();

        TOKEN
            .replace_all(text, |caps: &Captures<'_>| {
                let key = &caps[1];
                if let Some(value) = resolved.get(key) {
                    return value.clone();
                }
                match resolvers.get(key) {
                    Some(resolver) => {
                        let value = resolver();
                        resolved.insert(key.to_string(), value.clone());
                        value
                    }
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Resolver>> {
        self.resolvers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::{LATEST_TAG_ARGS, SHORT_REVISION_ARGS, ScriptedQuery};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_replaces_every_occurrence() {
        let registry = PlaceholderRegistry::new();
        registry.register("name", || "Impactor".to_string());
        assert_eq!(
            registry.substitute("{{name}} and {{name}} again"),
            "Impactor and Impactor again"
        );
    }

    #[test]
    fn test_unregistered_tokens_survive() {
        let registry = PlaceholderRegistry::new();
        registry.register("version", || "1.0".to_string());
        let out = registry.substitute("hello {{unknown}} at {{version}}");
        assert!(out.contains("{{unknown}}"));
        assert!(out.contains("1.0"));
    }

    #[test]
    fn test_resolver_called_once_per_key() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = PlaceholderRegistry::new();
        registry.register("n", move || counter.fetch_add(1, Ordering::SeqCst).to_string());

        let out = registry.substitute("{{n}}-{{n}}-{{n}}");
        assert_eq!(out, "0-0-0");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // a fresh pass evaluates again
        assert_eq!(registry.substitute("{{n}}"), "1");
    }

    #[test]
    fn test_resolver_not_called_when_absent() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let registry = PlaceholderRegistry::new();
        registry.register("unused", move || {
            counter.fetch_add(1, Ordering::SeqCst);
            String::new()
        });
        registry.substitute("nothing to see");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_last_write_wins() {
        let registry = PlaceholderRegistry::new();
        registry.register("k", || "first".to_string());
        registry.register("k", || "second".to_string());
        assert_eq!(registry.substitute("{{k}}"), "second");
        assert_eq!(registry.keys(), vec!["k".to_string()]);
    }

    #[test]
    fn test_substitute_is_idempotent() {
        let registry = PlaceholderRegistry::new();
        registry.register("a", || "alpha".to_string());
        let once = registry.substitute("{{a}} {{b}}");
        assert_eq!(registry.substitute(&once), once);
    }

    #[test]
    fn test_malformed_tokens_are_ignored() {
        let registry = PlaceholderRegistry::new();
        registry.register("a", || "x".to_string());
        assert_eq!(registry.substitute("{a} {{ a }} {{a}"), "{a} {{ a }} {{a}");
    }

    #[test]
    fn test_defaults() {
        let query = ScriptedQuery::new()
            .output(SHORT_REVISION_ARGS, "abc1234")
            .output(LATEST_TAG_ARGS, "v5.1.0");
        let inspector = GitInspector::new(query);
        let version = Version::new("5.1.0", "1.20.1", false, 0);
        let registry = PlaceholderRegistry::with_defaults(&version, &inspector);

        assert_eq!(registry.keys(), vec![COMMIT, LATEST_TAG, PREVIOUS_TAG, VERSION]);
        assert_eq!(
            registry.substitute("{{version}} @ {{commit}} ({{tags:latest}} after {{tags:previous}})"),
            "5.1.0+1.20.1 @ abc1234 (v5.1.0 after Unknown)"
        );
    }
}
