//! Per-release changelog generation.
//!
//! A changelog is the shared boilerplate followed by the product's release
//! notes (`{notes_dir}/{product}.md`), rendered through the placeholder
//! registry. Before rendering, `tags:history` is registered with a comparison
//! link between the previous and latest tags.
//!
//! Generation never fails a release: missing notes, a missing boilerplate or
//! any I/O error all produce [`NO_NOTES`].

use crate::error::ChangelogError;
use crate::git::{GitInspector, TagPair};
use crate::placeholder::{HISTORY, PlaceholderRegistry};
use std::path::{Path, PathBuf};

/// Text used whenever no changelog can be produced
pub const NO_NOTES: &str = "No changelog notes available...";

/// Outcome of looking up a product's release notes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotesLookup {
    /// Notes file contents
    Found(String),
    /// No notes file for this product
    NotFound,
}

/// Where changelog resources live and where output is staged
#[derive(Debug, Clone)]
pub struct ChangelogLayout {
    /// Directory with `{product}.md` notes
    pub notes_dir: PathBuf,
    /// Shared boilerplate template
    pub boilerplate: PathBuf,
    /// Staging directory for the rendered document
    pub staging_dir: PathBuf,
}

impl ChangelogLayout {
    /// Notes file for a product
    pub fn notes_path(&self, product: &str) -> PathBuf {
        self.notes_dir.join(format!("{}.md", product))
    }

    /// Staged changelog for a product
    pub fn staged_path(&self, product: &str) -> PathBuf {
        staged_path(&self.staging_dir, product)
    }
}

/// Renders changelog documents
pub struct ChangelogGenerator<'a> {
    registry: &'a PlaceholderRegistry,
    inspector: GitInspector,
    repository_url: String,
    layout: ChangelogLayout,
}

impl<'a> ChangelogGenerator<'a> {
    /// Create a generator rendering through `registry`
    pub fn new(
        registry: &'a PlaceholderRegistry,
        inspector: GitInspector,
        repository_url: impl Into<String>,
        layout: ChangelogLayout,
    ) -> Self {
        Self {
            registry,
            inspector,
            repository_url: repository_url.into().trim_end_matches('/').to_string(),
            layout,
        }
    }

    /// Resource layout in use
    pub fn layout(&self) -> &ChangelogLayout {
        &self.layout
    }

    /// Look up the release notes for `product`
    pub fn lookup_notes(&self, product: &str) -> Result<NotesLookup, ChangelogError> {
        let path = self.layout.notes_path(product);
        if !path.is_file() {
            return Ok(NotesLookup::NotFound);
        }
        read(&path).map(NotesLookup::Found)
    }

    /// Render the changelog for `product`, falling back to [`NO_NOTES`]
    pub fn generate(&self, product: &str) -> String {
        match self.try_generate(product) {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Changelog generation for '{}' failed: {}", product, e);
                NO_NOTES.to_string()
            }
        }
    }

    /// Render the changelog and write it to the staging directory
    ///
    /// Re-running overwrites the previous output.
    pub fn stage(&self, product: &str) -> Result<PathBuf, ChangelogError> {
        let text = self.generate(product);
        let path = self.layout.staged_path(product);

        let write = |path: &Path| -> std::io::Result<()> {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, &text)
        };
        write(&path).map_err(|source| ChangelogError::Write {
            path: path.clone(),
            source,
        })?;

        log::info!("Staged changelog for '{}' at {}", product, path.display());
        Ok(path)
    }

    fn try_generate(&self, product: &str) -> Result<String, ChangelogError> {
        let notes = match self.lookup_notes(product)? {
            NotesLookup::Found(notes) => notes,
            NotesLookup::NotFound => {
                log::info!(
                    "No release notes at {}",
                    self.layout.notes_path(product).display()
                );
                return Ok(NO_NOTES.to_string());
            }
        };

        let inspector = self.inspector.clone();
        let repository_url = self.repository_url.clone();
        self.registry.register(HISTORY, move || {
            history_link(&repository_url, &inspector.tag_pair())
        });

        let boilerplate_path = &self.layout.boilerplate;
        if !boilerplate_path.is_file() {
            return Err(ChangelogError::MissingBoilerplate {
                path: boilerplate_path.clone(),
            });
        }
        let boilerplate = read(boilerplate_path)?;

        let document = format!("{}\n\n{}", boilerplate.trim_end(), notes);
        Ok(self.registry.substitute(&document))
    }
}

/// Markdown link comparing `previous` to `latest` on the hosting project
pub fn history_link(repository_url: &str, tags: &TagPair) -> String {
    format!(
        "[{previous}...{latest}]({url}/compare/{previous}...{latest})",
        previous = tags.previous,
        latest = tags.latest,
        url = repository_url.trim_end_matches('/'),
    )
}

/// Staged changelog location, `{staging_dir}/{product}.md`
pub fn staged_path(staging_dir: &Path, product: &str) -> PathBuf {
    staging_dir.join(format!("{}.md", product))
}

/// Read a previously staged changelog, or [`NO_NOTES`] when there is none
pub fn read_staged(staging_dir: &Path, product: &str) -> String {
    let path = staged_path(staging_dir, product);
    match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!("Could not read staged changelog {}: {}", path.display(), e);
            }
            NO_NOTES.to_string()
        }
    }
}

fn read(path: &Path) -> Result<String, ChangelogError> {
    std::fs::read_to_string(path).map_err(|source| ChangelogError::Read {
        path: path.to_path_buf(),
        source,
    })
}
