use anyhow::{Context, Result};
use composekit::{ProjectOptions, Recreate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

pub const CONFIG_FILE: &str = "config.toml";

/// composectl configuration (`config.toml`)
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to the docker CLI (searched on PATH when unset)
    pub docker: Option<String>,

    /// Defaults applied to every project before CLI flags
    pub defaults: Defaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub timeout: Option<u32>,
    pub remove_orphans: bool,
    pub dependencies: bool,
    pub recreate: Recreate,
    pub profiles: Vec<String>,
    pub env_files: Vec<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            timeout: None,
            remove_orphans: false,
            dependencies: true,
            recreate: Recreate::Auto,
            profiles: Vec::new(),
            env_files: Vec::new(),
        }
    }
}

impl Config {
    /// Load config from the resolved config dir, or defaults if there is none
    pub fn load(config_dir: Option<&Path>) -> Result<Self> {
        let path = paths::config_dir(config_dir)?.join(CONFIG_FILE);
        Self::load_from(&path)
    }

    /// Load config from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("Config file {} does not exist, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Docker CLI path with `~` expanded
    pub fn docker_path(&self) -> Option<PathBuf> {
        self.docker.as_deref().map(paths::expand_path)
    }

    /// Project options seeded from the configured defaults
    pub fn project_options(&self, project_src: PathBuf) -> ProjectOptions {
        let mut options = ProjectOptions::new(project_src);
        options.timeout = self.defaults.timeout;
        options.remove_orphans = self.defaults.remove_orphans;
        options.dependencies = self.defaults.dependencies;
        options.recreate = self.defaults.recreate;
        options.profiles.clone_from(&self.defaults.profiles);
        options.env_files.clone_from(&self.defaults.env_files);
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert!(config.docker.is_none());
        assert!(config.defaults.dependencies);
        assert_eq!(config.defaults.recreate, Recreate::Auto);
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"
docker = "/usr/local/bin/docker"

[defaults]
timeout = 20
recreate = "never"
dependencies = false
profiles = ["debug"]
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.docker_path(), Some(PathBuf::from("/usr/local/bin/docker")));

        let options = config.project_options(PathBuf::from("/srv/flask"));
        assert_eq!(options.timeout, Some(20));
        assert_eq!(options.recreate, Recreate::Never);
        assert!(!options.dependencies);
        assert!(!options.remove_orphans);
        assert_eq!(options.profiles, vec!["debug"]);
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "[defaults]\nrecreate = \"sometimes\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }
}
