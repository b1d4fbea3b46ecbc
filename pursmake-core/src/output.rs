//! Report writers.

use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use crate::tasks::TaskRun;
use crate::validate::ValidationReport;

/// Write any report as prettified JSON, newline-terminated.
pub fn write_json_pretty<T: Serialize>(value: &T, mut w: impl Write) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    w.write_all(json.as_bytes())?;
    w.write_all(b"\n")?;
    Ok(())
}

/// Write one plain line per executed task.
pub fn write_task_summary(runs: &[TaskRun], mut w: impl Write) -> Result<()> {
    for run in runs {
        writeln!(w, "{:<12} {}ms", run.name, run.duration_ms)?;
    }
    Ok(())
}

/// Write one `path:line:column: message` line per validation issue.
pub fn write_validation_plain(report: &ValidationReport, mut w: impl Write) -> Result<()> {
    for failure in &report.failures {
        for issue in &failure.issues {
            writeln!(
                w,
                "{}:{}:{}: {}",
                failure.path.display(),
                issue.line,
                issue.column,
                issue.message
            )?;
        }
    }
    Ok(())
}
