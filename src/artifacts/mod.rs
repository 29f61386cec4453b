//! Platform artifact discovery and staging.
//!
//! Each platform's packaging task (external to this crate) must have produced
//! exactly one output file. The collector copies, never moves, every output
//! into the staging directory. A missing output aborts the release.

use crate::config::PlatformSettings;
use crate::error::ArtifactError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Staged artifacts keyed by platform
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StagingManifest {
    /// Platform key -> staged copy
    pub artifacts: BTreeMap<String, PathBuf>,
}

impl StagingManifest {
    /// Staged artifact for a platform
    pub fn get(&self, platform: &str) -> Option<&Path> {
        self.artifacts.get(platform).map(PathBuf::as_path)
    }

    /// Number of staged artifacts
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether nothing was staged
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

/// Copies platform outputs into one staging directory
#[derive(Debug, Clone)]
pub struct ArtifactCollector {
    staging_dir: PathBuf,
}

impl ArtifactCollector {
    /// Create a collector targeting `staging_dir`
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    /// Staging directory
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Copy each platform's output into the staging directory
    ///
    /// Every output is verified before anything is copied, so a missing
    /// platform or two platforms sharing a file name leave the staging
    /// directory untouched. An output that already lives in the staging
    /// directory is recorded without copying.
    pub fn collect(
        &self,
        platform_outputs: &BTreeMap<String, PathBuf>,
    ) -> Result<StagingManifest, ArtifactError> {
        for (platform, path) in platform_outputs {
            verify(platform, path)?;
        }
        let destinations = self.destinations(platform_outputs)?;

        std::fs::create_dir_all(&self.staging_dir).map_err(|source| {
            ArtifactError::StagingDir {
                path: self.staging_dir.clone(),
                source,
            }
        })?;

        let mut manifest = StagingManifest::default();
        for (platform, from, to) in destinations {
            if same_file(from, &to) {
                log::debug!("{} artifact already staged at {}", platform, to.display());
            } else {
                std::fs::copy(from, &to).map_err(|source| ArtifactError::Copy {
                    platform: platform.clone(),
                    from: from.clone(),
                    to: to.clone(),
                    source,
                })?;
            }

            log::info!("Staged {} artifact {}", platform, to.display());
            manifest.artifacts.insert(platform.clone(), to);
        }

        Ok(manifest)
    }

    /// Pair every output with its staged path, rejecting shared file names
    fn destinations<'a>(
        &self,
        platform_outputs: &'a BTreeMap<String, PathBuf>,
    ) -> Result<Vec<(&'a String, &'a PathBuf, PathBuf)>, ArtifactError> {
        let mut claimed: BTreeMap<&OsStr, &String> = BTreeMap::new();
        let mut destinations = Vec::with_capacity(platform_outputs.len());

        for (platform, from) in platform_outputs {
            let file_name = from.file_name().ok_or_else(|| ArtifactError::Missing {
                platform: platform.clone(),
                path: from.clone(),
            })?;
            if let Some(first) = claimed.insert(file_name, platform) {
                return Err(ArtifactError::DuplicateDestination {
                    file: file_name.to_string_lossy().into_owned(),
                    first: first.clone(),
                    second: platform.clone(),
                });
            }
            destinations.push((platform, from, self.staging_dir.join(file_name)));
        }

        Ok(destinations)
    }
}

/// Whether `to` already is `from`; copying a file onto itself truncates it
fn same_file(from: &Path, to: &Path) -> bool {
    match (from.canonicalize(), to.canonicalize()) {
        (Ok(from), Ok(to)) => from == to,
        _ => false,
    }
}

/// Find the single output file of every platform under `root`
pub fn resolve_outputs(
    platforms: &[PlatformSettings],
    root: &Path,
) -> Result<BTreeMap<String, PathBuf>, ArtifactError> {
    let mut outputs = BTreeMap::new();
    for platform in platforms {
        let path = resolve_output(platform, root)?;
        log::debug!(
            "Task '{}' for platform '{}' produced {}",
            platform.task,
            platform.name,
            path.display()
        );
        outputs.insert(platform.name.clone(), path);
    }
    Ok(outputs)
}

/// Find the one file matching a platform's output pattern
pub fn resolve_output(platform: &PlatformSettings, root: &Path) -> Result<PathBuf, ArtifactError> {
    let pattern_path = if Path::new(&platform.output).is_absolute() {
        PathBuf::from(&platform.output)
    } else {
        root.join(&platform.output)
    };
    let pattern = pattern_path.to_string_lossy().into_owned();

    let entries = glob::glob(&pattern).map_err(|e| ArtifactError::InvalidPattern {
        platform: platform.name.clone(),
        pattern: platform.output.clone(),
        reason: e.to_string(),
    })?;

    let mut matches: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .filter(|path| path.is_file())
        .collect();

    match matches.len() {
        0 => Err(ArtifactError::Missing {
            platform: platform.name.clone(),
            path: pattern_path,
        }),
        1 => Ok(matches.remove(0)),
        count => Err(ArtifactError::Ambiguous {
            platform: platform.name.clone(),
            pattern: platform.output.clone(),
            count,
        }),
    }
}

fn verify(platform: &str, path: &Path) -> Result<(), ArtifactError> {
    let metadata = std::fs::metadata(path).map_err(|_| ArtifactError::Missing {
        platform: platform.to_string(),
        path: path.to_path_buf(),
    })?;

    if !metadata.is_file() {
        return Err(ArtifactError::Missing {
            platform: platform.to_string(),
            path: path.to_path_buf(),
        });
    }

    // An empty file means the packaging task failed part-way
    if metadata.len() == 0 {
        return Err(ArtifactError::Empty {
            platform: platform.to_string(),
            path: path.to_path_buf(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn platform(name: &str, output: &str) -> PlatformSettings {
        PlatformSettings {
            name: name.to_string(),
            label: None,
            task: "remapProductionJar".to_string(),
            output: output.to_string(),
            loaders: Vec::new(),
            download_url: None,
        }
    }

    #[test]
    fn test_resolve_output_single_match() {
        let dir = tempfile::tempdir().expect("tempdir");
        let libs = dir.path().join("fabric/build/libs");
        std::fs::create_dir_all(&libs).expect("mkdir");
        std::fs::write(libs.join("Impactor-Fabric-5.1.0.jar"), b"jar").expect("write");

        let path = resolve_output(&platform("fabric", "fabric/build/libs/*.jar"), dir.path())
            .expect("one output");
        assert!(path.ends_with("Impactor-Fabric-5.1.0.jar"));
    }

    #[test]
    fn test_resolve_output_missing() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = resolve_output(&platform("forge", "forge/build/libs/*.jar"), dir.path())
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { ref platform, .. } if platform == "forge"));
    }

    #[test]
    fn test_resolve_output_ambiguous() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join("a.jar"), b"a").expect("write");
        std::fs::write(dir.path().join("b.jar"), b"b").expect("write");
        let err = resolve_output(&platform("fabric", "*.jar"), dir.path()).unwrap_err();
        assert!(matches!(err, ArtifactError::Ambiguous { count: 2, .. }));
    }

    #[test]
    fn test_empty_output_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let jar = dir.path().join("empty.jar");
        std::fs::write(&jar, b"").expect("write");

        let outputs = BTreeMap::from([("sponge".to_string(), jar)]);
        let err = ArtifactCollector::new(dir.path().join("deploy"))
            .collect(&outputs)
            .unwrap_err();
        assert!(matches!(err, ArtifactError::Empty { .. }));
    }

    #[test]
    fn test_same_file_name_from_two_platforms_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut outputs = BTreeMap::new();
        for (name, content) in [("fabric", "fabric-jar"), ("forge", "forge-jar")] {
            let libs = dir.path().join(name).join("build/libs");
            std::fs::create_dir_all(&libs).expect("mkdir");
            let jar = libs.join("Impactor.jar");
            std::fs::write(&jar, content).expect("write");
            outputs.insert(name.to_string(), jar);
        }

        let deploy = dir.path().join("deploy");
        let err = ArtifactCollector::new(&deploy).collect(&outputs).unwrap_err();
        match err {
            ArtifactError::DuplicateDestination {
                file,
                first,
                second,
            } => {
                assert_eq!(file, "Impactor.jar");
                assert_eq!(first, "fabric");
                assert_eq!(second, "forge");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(!deploy.exists());
    }

    #[test]
    fn test_distinct_file_names_keep_their_content() {
        let dir = tempfile::tempdir().expect("tempdir");
        let fabric = dir.path().join("Impactor-Fabric.jar");
        let forge = dir.path().join("Impactor-Forge.jar");
        std::fs::write(&fabric, "fabric-jar").expect("write");
        std::fs::write(&forge, "forge-jar").expect("write");
        let outputs = BTreeMap::from([
            ("fabric".to_string(), fabric),
            ("forge".to_string(), forge),
        ]);

        let manifest = ArtifactCollector::new(dir.path().join("deploy"))
            .collect(&outputs)
            .expect("collect");
        let staged = |platform: &str| {
            std::fs::read_to_string(manifest.get(platform).expect("staged")).expect("read")
        };
        assert_eq!(staged("fabric"), "fabric-jar");
        assert_eq!(staged("forge"), "forge-jar");
    }

    #[test]
    fn test_output_already_in_staging_is_kept() {
        let dir = tempfile::tempdir().expect("tempdir");
        let deploy = dir.path().join("deploy");
        std::fs::create_dir_all(&deploy).expect("mkdir");
        let jar = deploy.join("Impactor.jar");
        std::fs::write(&jar, b"fabricjar").expect("write");

        let outputs = BTreeMap::from([("fabric".to_string(), jar.clone())]);
        let manifest = ArtifactCollector::new(&deploy)
            .collect(&outputs)
            .expect("collect");

        assert_eq!(manifest.get("fabric"), Some(jar.as_path()));
        assert_eq!(std::fs::read(&jar).expect("read"), b"fabricjar");
    }
}
