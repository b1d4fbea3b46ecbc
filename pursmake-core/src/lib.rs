//! pursmake-core: the build machinery behind the `pursmake` task runner.
//!
//! A PureScript project build is a handful of named tasks over
//! glob-selected file sets: compile the sources, bundle the compiled
//! modules, generate docs, sanity-check the JavaScript FFI files, and
//! clean the output directory. This crate provides the pieces:
//!
//! - [`pattern`] / [`discovery`]: glob patterns and filesystem walking.
//! - [`config`]: project configuration with `pursmake.toml` overrides.
//! - [`toolchain`]: adapters around the `purs` compiler, doc generator
//!   and bundler.
//! - [`validate`]: the per-file foreign-code syntax scan.
//! - [`tasks`]: the task registry, dependency resolution and runner.
//! - [`output`]: report writers for the CLI.

pub mod config;
pub mod discovery;
pub mod output;
pub mod pattern;
pub mod tasks;
pub mod toolchain;
pub mod validate;

pub use config::ProjectConfig;
pub use tasks::{standard_registry, Registry, Task, TaskContext, TaskRun};
