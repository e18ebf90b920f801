use crate::error::Result;
use crate::fs::Fs;
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Component, Path};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// VcsConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VcsConfig {
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Identity stamped on every checkpoint tag.
    #[serde(default = "default_tagger_name")]
    pub tagger_name: String,
    #[serde(default = "default_tagger_email")]
    pub tagger_email: String,
}

fn default_binary() -> String {
    "git".to_string()
}

fn default_tagger_name() -> String {
    "mission".to_string()
}

fn default_tagger_email() -> String {
    "mission@localhost".to_string()
}

impl Default for VcsConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            tagger_name: default_tagger_name(),
            tagger_email: default_tagger_email(),
        }
    }
}

// ---------------------------------------------------------------------------
// TemplatesConfig
// ---------------------------------------------------------------------------

/// Directories the template emitter writes AI-tool prompts into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default = "default_template_dirs")]
    pub dirs: Vec<String>,
}

fn default_template_dirs() -> Vec<String> {
    vec![".claude/commands".to_string()]
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        Self {
            dirs: default_template_dirs(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config (top-level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub vcs: VcsConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            vcs: VcsConfig::default(),
            templates: TemplatesConfig::default(),
        }
    }
}

impl Config {
    /// Load `<mission_dir>/config.yaml`, falling back to defaults when absent.
    pub fn load(fs: &dyn Fs, mission_dir: &Path) -> Result<Self> {
        let path = paths::config_file(mission_dir);
        if !fs.exists(&path) {
            return Ok(Self::default());
        }
        let data = fs.read_to_string(&path)?;
        if data.trim().is_empty() {
            return Ok(Self::default());
        }
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, fs: &dyn Fs, mission_dir: &Path) -> Result<()> {
        let path = paths::config_file(mission_dir);
        let data = serde_yaml::to_string(self)?;
        fs.write(&path, data.as_bytes())
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.vcs.binary.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "vcs.binary is empty".to_string(),
            });
        }

        if self.vcs.tagger_name.trim().is_empty() || self.vcs.tagger_email.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: "vcs tagger identity is incomplete; checkpoint tags need a name and email"
                    .to_string(),
            });
        }

        for dir in &self.templates.dirs {
            let path = Path::new(dir);
            if path.is_absolute() || path.components().any(|c| c == Component::ParentDir) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Warning,
                    message: format!("template dir '{dir}' points outside the project"),
                });
            }
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;

    #[test]
    fn missing_config_uses_defaults() {
        let fs = MemFs::new();
        let cfg = Config::load(&fs, Path::new("/p/.mission")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.vcs.tagger_name, "mission");
    }

    #[test]
    fn partial_config_fills_defaults() {
        let fs = MemFs::new();
        fs.write(
            Path::new("/p/.mission/config.yaml"),
            b"vcs:\n  tagger_name: bot\n",
        )
        .unwrap();
        let cfg = Config::load(&fs, Path::new("/p/.mission")).unwrap();
        assert_eq!(cfg.vcs.tagger_name, "bot");
        assert_eq!(cfg.vcs.tagger_email, "mission@localhost");
        assert_eq!(cfg.templates.dirs, vec![".claude/commands".to_string()]);
    }

    #[test]
    fn save_then_load() {
        let fs = MemFs::new();
        let dir = Path::new("/p/.mission");
        let mut cfg = Config::default();
        cfg.templates.dirs.push(".cursor/rules".to_string());
        cfg.save(&fs, dir).unwrap();
        assert_eq!(Config::load(&fs, dir).unwrap(), cfg);
    }

    #[test]
    fn validate_flags_escaping_template_dir_and_empty_tagger() {
        let mut cfg = Config::default();
        cfg.templates.dirs.push("../elsewhere".to_string());
        cfg.vcs.tagger_email = String::new();
        let warnings = cfg.validate();
        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().any(|w| w.level == WarnLevel::Error));
        assert!(warnings.iter().any(|w| w.message.contains("../elsewhere")));
    }

    #[test]
    fn default_config_has_no_warnings() {
        assert!(Config::default().validate().is_empty());
    }
}
