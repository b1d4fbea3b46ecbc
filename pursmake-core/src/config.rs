//! Project configuration: build globs, output locations, toolchain binary.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

/// Config file looked up under the project root.
pub const CONFIG_FILE: &str = "pursmake.toml";

/// Everything a build needs to know about a project. The defaults are
/// the layout of a bower-era PureScript library; any field can be
/// overridden from `pursmake.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Globs selecting PureScript sources.
    pub sources: Vec<String>,
    /// Globs selecting foreign (JavaScript FFI) files.
    pub foreigns: Vec<String>,
    /// Directory the compiler writes modules into; `clean` removes it.
    pub output_dir: PathBuf,
    /// Globs selecting compiled modules to bundle.
    pub bundle_inputs: Vec<String>,
    /// Path of the produced bundle.
    pub bundle_output: PathBuf,
    /// Module name to markdown output path, passed to the doc generator.
    pub docs: BTreeMap<String, PathBuf>,
    /// Toolchain binary to invoke.
    pub purs: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            sources: vec![
                "src/**/*.purs".to_string(),
                "examples/*/*.purs".to_string(),
                "bower_components/purescript-*/src/**/*.purs".to_string(),
            ],
            foreigns: vec![
                "src/**/*.js".to_string(),
                "bower_components/purescript-*/src/**/*.js".to_string(),
            ],
            output_dir: PathBuf::from("output"),
            bundle_inputs: vec!["output/**/*.js".to_string()],
            bundle_output: PathBuf::from("output/bundle.js"),
            docs: BTreeMap::from([(
                "Pux.Undo".to_string(),
                PathBuf::from("docs/Pux/Undo.md"),
            )]),
            purs: "purs".to_string(),
        }
    }
}

impl ProjectConfig {
    /// Parse a TOML config file. Missing fields fall back to defaults;
    /// unknown fields are rejected.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config for a project root: an explicit path wins
    /// (and must exist), otherwise `pursmake.toml` under the root if
    /// present, otherwise defaults.
    pub fn discover(root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(anyhow!("config file does not exist: {}", path.display()));
            }
            return Self::load(path);
        }

        let candidate = root.join(CONFIG_FILE);
        if candidate.exists() {
            Self::load(&candidate)
        } else {
            Ok(Self::default())
        }
    }
}
