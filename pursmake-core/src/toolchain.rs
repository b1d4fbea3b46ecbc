//! Adapters around the `purs` toolchain: compile, docs, bundle.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{anyhow, Context, Result};

/// Invoker for `purs` subcommands, running from a project root.
///
/// pursmake expands globs itself and hands the toolchain explicit file
/// lists; the binary is configurable so tests can substitute a fake.
#[derive(Debug, Clone)]
pub struct PursToolchain {
    binary: String,
    root: PathBuf,
}

impl PursToolchain {
    pub fn new<P: Into<PathBuf>>(binary: &str, root: P) -> Self {
        Self {
            binary: binary.to_string(),
            root: root.into(),
        }
    }

    /// Compile sources (with their FFI files) into `output_dir`.
    pub fn compile(&self, sources: &[PathBuf], foreigns: &[PathBuf], output_dir: &Path) -> Result<()> {
        self.run(compile_args(sources, foreigns, output_dir), "compile")
    }

    /// Generate markdown docs for the configured modules.
    pub fn docs(&self, sources: &[PathBuf], docgen: &BTreeMap<String, PathBuf>) -> Result<()> {
        for path in docgen.values() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(self.root.join(parent))
                    .with_context(|| format!("creating docs directory {}", parent.display()))?;
            }
        }
        self.run(docs_args(sources, docgen), "docs")
    }

    /// Bundle compiled modules into a single file.
    pub fn bundle(&self, inputs: &[PathBuf], output: &Path) -> Result<()> {
        self.run(bundle_args(inputs, output), "bundle")
    }

    fn run(&self, args: Vec<OsString>, what: &str) -> Result<()> {
        tracing::debug!("running `{} {}` with {} args", self.binary, what, args.len());

        let output = Command::new(&self.binary)
            .args(&args)
            .current_dir(&self.root)
            .output()
            .with_context(|| format!("spawning `{} {what}`", self.binary))?;

        if !output.stdout.is_empty() {
            tracing::debug!("{} {what} stdout: {}", self.binary, String::from_utf8_lossy(&output.stdout).trim());
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(anyhow!(
                "`{} {what}` failed ({}): {}",
                self.binary,
                output.status,
                stderr.trim()
            ));
        }

        // Compiler warnings land on stderr even on success.
        if !output.stderr.is_empty() {
            tracing::warn!("{}", String::from_utf8_lossy(&output.stderr).trim());
        }

        Ok(())
    }
}

pub fn compile_args(sources: &[PathBuf], foreigns: &[PathBuf], output_dir: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["compile".into(), "--output".into(), output_dir.into()];
    args.extend(sources.iter().map(OsString::from));
    for foreign in foreigns {
        args.push("--ffi".into());
        args.push(foreign.into());
    }
    args
}

pub fn docs_args(sources: &[PathBuf], docgen: &BTreeMap<String, PathBuf>) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["docs".into()];
    for (module, path) in docgen {
        args.push("--docgen".into());
        args.push(format!("{}:{}", module, path.display()).into());
    }
    args.extend(sources.iter().map(OsString::from));
    args
}

pub fn bundle_args(inputs: &[PathBuf], output: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["bundle".into()];
    args.extend(inputs.iter().map(OsString::from));
    args.push("--output".into());
    args.push(output.into());
    args
}
