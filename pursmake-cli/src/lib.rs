//! pursmake CLI: run named build tasks for a PureScript project.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, ValueHint};
use tracing_subscriber::EnvFilter;

use pursmake_core::output::{write_json_pretty, write_task_summary};
use pursmake_core::{standard_registry, ProjectConfig, TaskContext};

/// CLI entrypoint for pursmake.
#[derive(Debug, Parser)]
#[command(
    name = "pursmake",
    about = "Task runner for PureScript project builds (compile, bundle, docs, validate, clean)"
)]
pub struct Cli {
    /// Tasks to run, prerequisites included; no tasks means `default`
    tasks: Vec<String>,

    /// Project root to operate in
    #[arg(short = 'C', long = "root", default_value = ".", value_hint = ValueHint::DirPath)]
    root: PathBuf,

    /// Config file (default: pursmake.toml under the root, if present)
    #[arg(long = "config", value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Toolchain binary override
    #[arg(long = "purs")]
    purs: Option<String>,

    /// Thread cap for foreign-file validation
    #[arg(long = "jobs")]
    jobs: Option<usize>,

    /// List registered tasks and exit
    #[arg(long = "list", action = ArgAction::SetTrue)]
    list: bool,

    /// Emit the task report as JSON on stdout
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,

    /// Debug logging
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    verbose: bool,
}

/// Parse CLI args and execute the requested tasks.
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let stdout = io::stdout();
    execute(cli, stdout.lock())
}

fn execute(cli: Cli, mut out: impl Write) -> Result<()> {
    let registry = standard_registry()?;

    if cli.list {
        for name in registry.names() {
            if let Some(task) = registry.find(name) {
                if task.deps().is_empty() {
                    writeln!(out, "{name}")?;
                } else {
                    writeln!(out, "{name} (after: {})", task.deps().join(", "))?;
                }
            }
        }
        return Ok(());
    }

    let mut config = ProjectConfig::discover(&cli.root, cli.config.as_deref())?;
    if let Some(purs) = &cli.purs {
        config.purs = purs.clone();
    }
    tracing::debug!(
        "project root {}, toolchain `{}`",
        cli.root.display(),
        config.purs
    );

    let tasks = if cli.tasks.is_empty() {
        vec!["default".to_string()]
    } else {
        cli.tasks.clone()
    };

    let ctx = TaskContext::new(&cli.root, config, cli.jobs);
    let runs = registry.run(&tasks, &ctx)?;

    if cli.json {
        write_json_pretty(&runs, &mut out)?;
    } else {
        write_task_summary(&runs, &mut out)?;
    }

    Ok(())
}

/// Logs go to stderr; stdout carries only task reports.
fn init_logger(verbose: bool) {
    let default_filter = if verbose {
        "pursmake=debug,pursmake_core=debug,info"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();
}

#[cfg(test)]
mod tests;
