use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Preview defaults loaded from a TOML file; CLI flags win over these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fps: Option<f32>,
    pub shader: Option<PathBuf>,
}

impl PreviewConfig {
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("failed to read config file at {}", path.display()))?;
            let config: Self = toml::from_str(&contents)
                .with_context(|| format!("failed to parse config file at {}", path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = PreviewConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
        assert!(config.width.is_none());
        assert!(config.shader.is_none());
    }

    #[test]
    fn parses_a_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "width = 1280\nheight = 720\nshader = \"demo.frag\"\n").unwrap();

        let config = PreviewConfig::load_or_default(&path).unwrap();
        assert_eq!(config.width, Some(1280));
        assert_eq!(config.height, Some(720));
        assert_eq!(config.shader, Some(PathBuf::from("demo.frag")));
        assert!(config.fps.is_none());
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "width = \"wide\"\n").unwrap();
        assert!(PreviewConfig::load_or_default(&path).is_err());
    }
}
