//! Named build tasks: registry, dependency resolution, execution.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;

use crate::config::ProjectConfig;
use crate::discovery::ProjectWalker;
use crate::output::write_validation_plain;
use crate::pattern::PatternSet;
use crate::toolchain::PursToolchain;
use crate::validate::validate_files;

/// Everything tasks share for one invocation.
pub struct TaskContext {
    pub root: PathBuf,
    pub config: ProjectConfig,
    pub toolchain: PursToolchain,
    /// Thread cap for validation; `None` uses rayon's default.
    pub jobs: Option<usize>,
}

impl TaskContext {
    pub fn new<P: Into<PathBuf>>(root: P, config: ProjectConfig, jobs: Option<usize>) -> Self {
        let root = root.into();
        let toolchain = PursToolchain::new(&config.purs, &root);
        Self {
            root,
            config,
            toolchain,
            jobs,
        }
    }

    fn discover(&self, globs: &[String]) -> Result<Vec<PathBuf>> {
        let patterns = PatternSet::new(globs)?;
        ProjectWalker::new(&self.root).matching(&patterns)
    }
}

/// One named build step. Prerequisites are named, not referenced:
/// the registry resolves them at invocation time.
pub trait Task {
    fn name(&self) -> &str;
    fn deps(&self) -> &[&str] {
        &[]
    }
    fn run(&self, ctx: &TaskContext) -> Result<()>;
}

impl std::fmt::Debug for dyn Task + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task").field("name", &self.name()).finish()
    }
}

/// Record of one executed task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskRun {
    pub name: String,
    pub duration_ms: u64,
}

/// Task lookup plus dependency-ordered execution.
#[derive(Default)]
pub struct Registry {
    tasks: Vec<Box<dyn Task>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task: Box<dyn Task>) -> Result<()> {
        if self.find(task.name()).is_some() {
            return Err(anyhow!("task `{}` registered twice", task.name()));
        }
        self.tasks.push(task);
        Ok(())
    }

    /// Registered task names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.name()).collect()
    }

    pub fn find(&self, name: &str) -> Option<&dyn Task> {
        self.tasks
            .iter()
            .find(|t| t.name() == name)
            .map(|t| t.as_ref())
    }

    /// Expand requested task names into an execution plan: depth-first
    /// postorder, so every prerequisite precedes its dependents, and
    /// each task appears at most once per invocation.
    pub fn resolve(&self, requested: &[String]) -> Result<Vec<&dyn Task>> {
        let mut order = Vec::new();
        let mut done = HashSet::new();
        let mut visiting = Vec::new();
        for name in requested {
            self.visit(name, &mut order, &mut done, &mut visiting)?;
        }
        Ok(order)
    }

    fn visit<'a>(
        &'a self,
        name: &str,
        order: &mut Vec<&'a dyn Task>,
        done: &mut HashSet<&'a str>,
        visiting: &mut Vec<&'a str>,
    ) -> Result<()> {
        if done.contains(name) {
            return Ok(());
        }
        if visiting.iter().any(|v| *v == name) {
            return Err(anyhow!(
                "task dependency cycle: {} -> {name}",
                visiting.join(" -> ")
            ));
        }

        let task = self.find(name).ok_or_else(|| {
            anyhow!(
                "unknown task `{name}`; known tasks: {}",
                self.names().join(", ")
            )
        })?;

        visiting.push(task.name());
        for dep in task.deps() {
            self.visit(dep, order, done, visiting)?;
        }
        visiting.pop();

        done.insert(task.name());
        order.push(task);
        Ok(())
    }

    /// Run the requested tasks (with prerequisites) sequentially. A
    /// task starts only after everything before it in the plan has
    /// completed successfully; the first failure aborts the run.
    pub fn run(&self, requested: &[String], ctx: &TaskContext) -> Result<Vec<TaskRun>> {
        let plan = self.resolve(requested)?;
        let plan_names: Vec<&str> = plan.iter().map(|t| t.name()).collect();
        tracing::debug!("execution plan: {}", plan_names.join(" -> "));

        let mut runs = Vec::new();
        for task in plan {
            tracing::info!("task `{}` starting", task.name());
            let start = Instant::now();
            task.run(ctx)
                .with_context(|| format!("task `{}` failed", task.name()))?;
            let duration_ms = start.elapsed().as_millis() as u64;
            tracing::info!("task `{}` finished in {duration_ms}ms", task.name());
            runs.push(TaskRun {
                name: task.name().to_string(),
                duration_ms,
            });
        }
        Ok(runs)
    }
}

/// The standard task set: `build`, `docs`, `test` (after `build`),
/// `clean`, `jsvalidate`, and the `default` alias for `test`.
pub fn standard_registry() -> Result<Registry> {
    let mut registry = Registry::new();
    let tasks: Vec<Box<dyn Task>> = vec![
        Box::new(BuildTask),
        Box::new(DocsTask),
        Box::new(TestTask),
        Box::new(CleanTask),
        Box::new(JsValidateTask),
        Box::new(DefaultTask),
    ];
    for task in tasks {
        registry.register(task)?;
    }
    Ok(registry)
}

struct BuildTask;

impl Task for BuildTask {
    fn name(&self) -> &str {
        "build"
    }

    fn run(&self, ctx: &TaskContext) -> Result<()> {
        let sources = ctx.discover(&ctx.config.sources)?;
        if sources.is_empty() {
            bail!(
                "no source files matched [{}]",
                ctx.config.sources.join(", ")
            );
        }
        let foreigns = ctx.discover(&ctx.config.foreigns)?;
        tracing::info!(
            "compiling {} source files ({} foreign)",
            sources.len(),
            foreigns.len()
        );
        ctx.toolchain
            .compile(&sources, &foreigns, &ctx.config.output_dir)
    }
}

struct DocsTask;

impl Task for DocsTask {
    fn name(&self) -> &str {
        "docs"
    }

    fn run(&self, ctx: &TaskContext) -> Result<()> {
        let sources = ctx.discover(&ctx.config.sources)?;
        if sources.is_empty() {
            bail!(
                "no source files matched [{}]",
                ctx.config.sources.join(", ")
            );
        }
        ctx.toolchain.docs(&sources, &ctx.config.docs)
    }
}

struct TestTask;

impl Task for TestTask {
    fn name(&self) -> &str {
        "test"
    }

    fn deps(&self) -> &[&str] {
        &["build"]
    }

    fn run(&self, ctx: &TaskContext) -> Result<()> {
        let inputs = ctx.discover(&ctx.config.bundle_inputs)?;
        if inputs.is_empty() {
            bail!(
                "nothing to bundle: no files matched [{}]",
                ctx.config.bundle_inputs.join(", ")
            );
        }
        tracing::info!(
            "bundling {} compiled modules into {}",
            inputs.len(),
            ctx.config.bundle_output.display()
        );
        ctx.toolchain.bundle(&inputs, &ctx.config.bundle_output)
    }
}

struct CleanTask;

impl Task for CleanTask {
    fn name(&self) -> &str {
        "clean"
    }

    fn run(&self, ctx: &TaskContext) -> Result<()> {
        let dir = ctx.root.join(&ctx.config.output_dir);
        match fs::remove_dir_all(&dir) {
            Ok(()) => {
                tracing::info!("removed {}", ctx.config.output_dir.display());
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("removing {}", ctx.config.output_dir.display()))
            }
        }
    }
}

struct JsValidateTask;

impl Task for JsValidateTask {
    fn name(&self) -> &str {
        "jsvalidate"
    }

    fn run(&self, ctx: &TaskContext) -> Result<()> {
        let foreigns = ctx.discover(&ctx.config.foreigns)?;
        let report = validate_files(&ctx.root, &foreigns, ctx.jobs)?;

        if report.is_clean() {
            tracing::info!("{} foreign files validated", report.files_checked);
            return Ok(());
        }

        // Every file is reported before the task fails.
        let stderr = io::stderr();
        write_validation_plain(&report, stderr.lock())?;
        bail!(
            "{} of {} foreign files failed validation",
            report.failures.len(),
            report.files_checked
        )
    }
}

struct DefaultTask;

impl Task for DefaultTask {
    fn name(&self) -> &str {
        "default"
    }

    fn deps(&self) -> &[&str] {
        &["test"]
    }

    fn run(&self, _ctx: &TaskContext) -> Result<()> {
        Ok(())
    }
}
