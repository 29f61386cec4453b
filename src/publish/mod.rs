//! Package-registry publish contract.
//!
//! The registry transport is an external collaborator. This module produces
//! the per-platform payload it consumes and stages it as JSON next to the
//! artifacts, at `{staging_dir}/{platform}.publish.json`.

use crate::artifacts::StagingManifest;
use crate::config::{EnvConfig, ReleaseSettings};
use crate::error::{ArtifactError, Result};
use crate::version::{Version, VersionType};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Payload for publishing one platform's artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishManifest {
    /// Registry project identifier
    pub project_id: String,
    /// Machine version, e.g. `5.1.0+1.20.1-RC1`
    pub version_number: String,
    /// Human-readable version name
    pub version_name: String,
    /// `release` or `beta`
    pub version_type: VersionType,
    /// Rendered changelog
    pub changelog: String,
    /// Target platform identifiers
    pub game_versions: Vec<String>,
    /// Loader identifiers
    pub loaders: Vec<String>,
    /// Staged artifact to upload
    pub file: PathBuf,
}

/// Build the publish payload for every staged platform
///
/// Platforms are taken from configuration; each must have a staged artifact.
pub fn build_manifests(
    settings: &ReleaseSettings,
    version: &Version,
    changelog: &str,
    staged: &StagingManifest,
) -> Result<Vec<(String, PublishManifest)>> {
    let mut manifests = Vec::with_capacity(settings.platforms.len());

    for platform in &settings.platforms {
        let file = staged
            .get(&platform.name)
            .ok_or_else(|| ArtifactError::Missing {
                platform: platform.name.clone(),
                path: settings.staging_dir(),
            })?
            .to_path_buf();

        manifests.push((
            platform.name.clone(),
            PublishManifest {
                project_id: settings.project_id().to_string(),
                version_number: version.to_string(),
                version_name: version.display_name(settings.project_name()),
                version_type: version.version_type(),
                changelog: changelog.to_string(),
                game_versions: vec![version.platform_target().to_string()],
                loaders: platform.loaders(),
                file,
            },
        ));
    }

    Ok(manifests)
}

/// Write each manifest to `{staging_dir}/{platform}.publish.json`
pub fn write_manifests(
    staging_dir: &Path,
    manifests: &[(String, PublishManifest)],
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(staging_dir)?;

    let mut written = Vec::with_capacity(manifests.len());
    for (platform, manifest) in manifests {
        let path = staging_dir.join(format!("{}.publish.json", platform));
        let json = serde_json::to_string_pretty(manifest)?;
        std::fs::write(&path, json)?;
        log::info!("Wrote publish manifest {}", path.display());
        written.push(path);
    }
    Ok(written)
}

/// Whether the registry credential is present in the environment
pub fn has_registry_token(settings: &ReleaseSettings, env: &EnvConfig) -> bool {
    env.get(&settings.publish.token_env).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    const CONFIG: &str = r#"
product = "5.1.0"
platform_target = "1.20.1"
rc = 1
project_name = "Impactor"
repository_url = "https://github.com/NickImpact/Impactor"

[[platforms]]
name = "fabric"
task = "remapProductionJar"
output = "fabric/*.jar"

[[platforms]]
name = "forge"
task = "remapProductionJar"
output = "forge/*.jar"
loaders = ["forge", "neoforge"]
"#;

    #[test]
    fn test_manifest_fields() {
        let settings = ReleaseSettings::from_toml(CONFIG, "/repo").expect("valid config");
        let version = settings.version().expect("version");
        let staged = StagingManifest {
            artifacts: BTreeMap::from([
                ("fabric".to_string(), PathBuf::from("/repo/build/deploy/f.jar")),
                ("forge".to_string(), PathBuf::from("/repo/build/deploy/g.jar")),
            ]),
        };

        let manifests = build_manifests(&settings, &version, "notes", &staged).expect("manifests");
        assert_eq!(manifests.len(), 2);

        let (name, forge) = &manifests[1];
        assert_eq!(name, "forge");
        assert_eq!(forge.project_id, "Impactor");
        assert_eq!(forge.version_number, "5.1.0+1.20.1-RC1");
        assert_eq!(forge.version_name, "Impactor 5.1.0+1.20.1-RC1");
        assert_eq!(forge.version_type, VersionType::Beta);
        assert_eq!(forge.game_versions, vec!["1.20.1".to_string()]);
        assert_eq!(forge.loaders, vec!["forge".to_string(), "neoforge".to_string()]);

        let json = serde_json::to_value(forge).expect("json");
        assert_eq!(json["version_type"], "beta");
    }

    #[test]
    fn test_unstaged_platform_is_an_error() {
        let settings = ReleaseSettings::from_toml(CONFIG, "/repo").expect("valid config");
        let version = settings.version().expect("version");
        let err = build_manifests(&settings, &version, "", &StagingManifest::default()).unwrap_err();
        assert!(err.to_string().contains("fabric"));
    }
}
