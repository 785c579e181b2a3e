//! Configuration for structfields.
//!
//! Loads config from:
//! 1. Global: ~/.config/structfields/config.toml
//! 2. Per-project: .structfields/config.toml (overrides global)
//!
//! Command-line flags override both.
//!
//! Example config.toml:
//! ```toml
//! [scan]
//! directive_prefix = "//go:"
//! collapse_comments = false
//! max_embed_depth = 64
//!
//! [load]
//! tests = false
//! deps = true
//! goroot = "/usr/local/go"
//!
//! [output]
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use structfields_core::ScanOptions;
use structfields_go::LoadConfig;

use crate::output::OutputFormat;

/// `[scan]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub directive_prefix: Option<String>,
    pub collapse_comments: Option<bool>,
    pub max_embed_depth: Option<usize>,
}

/// `[load]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoadSection {
    pub tests: Option<bool>,
    pub deps: Option<bool>,
    pub goroot: Option<PathBuf>,
    pub mod_cache: Option<PathBuf>,
}

/// `[output]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
}

/// Root configuration structure. Unset fields fall through to the next layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StructfieldsConfig {
    pub scan: ScanConfig,
    pub load: LoadSection,
    pub output: OutputConfig,
}

impl StructfieldsConfig {
    /// Load configuration for a project: global config, then `.structfields/config.toml` under `root`.
    pub fn load(root: &Path) -> Self {
        let mut config = Self::default();

        if let Some(global_path) = Self::global_config_path()
            && let Some(global) = Self::load_file(&global_path)
        {
            config = config.merge(global);
        }

        let project_path = root.join(".structfields").join("config.toml");
        if let Some(project) = Self::load_file(&project_path) {
            config = config.merge(project);
        }

        config
    }

    /// Get the global config path.
    pub fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("structfields").join("config.toml"))
    }

    /// Load config from a file path. A missing file is not an error; an invalid one is logged.
    pub fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Some(config)
            }
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "ignoring invalid config");
                None
            }
        }
    }

    /// Merge another config into this one; fields set in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            scan: ScanConfig {
                directive_prefix: other.scan.directive_prefix.or(self.scan.directive_prefix),
                collapse_comments: other.scan.collapse_comments.or(self.scan.collapse_comments),
                max_embed_depth: other.scan.max_embed_depth.or(self.scan.max_embed_depth),
            },
            load: LoadSection {
                tests: other.load.tests.or(self.load.tests),
                deps: other.load.deps.or(self.load.deps),
                goroot: other.load.goroot.or(self.load.goroot),
                mod_cache: other.load.mod_cache.or(self.load.mod_cache),
            },
            output: OutputConfig {
                format: other.output.format.or(self.output.format),
            },
        }
    }

    /// Scan options with unset fields at their defaults.
    pub fn scan_options(&self) -> ScanOptions {
        let defaults = ScanOptions::default();
        ScanOptions {
            directive_prefix: self
                .scan
                .directive_prefix
                .clone()
                .unwrap_or(defaults.directive_prefix),
            collapse_comments: self
                .scan
                .collapse_comments
                .unwrap_or(defaults.collapse_comments),
            max_embed_depth: self.scan.max_embed_depth.unwrap_or(defaults.max_embed_depth),
        }
    }

    /// Loader configuration for `dir` with unset fields at their defaults.
    pub fn load_config(&self, dir: &Path) -> LoadConfig {
        let defaults = LoadConfig::new(dir);
        LoadConfig {
            tests: self.load.tests.unwrap_or(defaults.tests),
            deps: self.load.deps.unwrap_or(defaults.deps),
            goroot: self.load.goroot.clone().or(defaults.goroot),
            mod_cache: self.load.mod_cache.clone().or(defaults.mod_cache),
            dir: defaults.dir,
        }
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output.format.unwrap_or_default()
    }
}
