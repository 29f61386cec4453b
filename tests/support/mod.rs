//! Release workspace fixtures shared by the integration tests.

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const CONFIG: &str = r#"
product = "5.1.0"
platform_target = "1.20.1"
project_name = "Impactor"
repository_url = "https://github.com/NickImpact/Impactor"

[notify]
webhook_env = "PLUGIN_RELEASE_TEST_WEBHOOK_UNSET"

[publish]
project_id = "Ye5Ug1xj"

[[platforms]]
name = "fabric"
label = "Fabric"
task = "remapProductionJar"
output = "fabric/build/libs/*.jar"
download_url = "https://cdn.example.com/{{version}}/fabric.jar"

[[platforms]]
name = "sponge"
label = "Sponge"
task = "shadowJar"
output = "sponge/build/libs/*.jar"
"#;

/// A temporary project with configuration, changelog resources and outputs
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let workspace = Self {
            dir: tempfile::tempdir().expect("tempdir"),
        };
        workspace.write("release.toml", CONFIG);
        workspace
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("release.toml")
    }

    pub fn deploy(&self) -> PathBuf {
        self.root().join("build/deploy")
    }

    pub fn write(&self, relative: &str, contents: &str) -> PathBuf {
        let path = self.root().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("mkdir");
        }
        std::fs::write(&path, contents).expect("write fixture");
        path
    }

    pub fn with_changelog(self) -> Self {
        self.write("changelogs/boilerplate.md", "# Impactor {{version}}\n");
        self.write(
            "changelogs/Impactor.md",
            "Built from {{commit}}. Changes: {{tags:history}}\n",
        );
        self
    }

    pub fn with_outputs(self) -> Self {
        self.write("fabric/build/libs/Impactor-Fabric-5.1.0.jar", "fabric-jar");
        self.write("sponge/build/libs/Impactor-Sponge-5.1.0.jar", "sponge-jar");
        self
    }
}
