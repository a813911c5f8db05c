use crate::error::ReportError;
use crate::orchestrator::{ItemOutcome, RunReport, RunSummary};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize)]
struct SummaryFile<'a> {
    output_dir: &'a Path,
    duration_sec: f64,
    summary: RunSummary,
    items: &'a [ItemOutcome],
}

/// Human-readable end-of-run report
pub fn render_summary(report: &RunReport, output_dir: &Path) -> String {
    let summary = report.summary();
    let mut out = format!(
        "Summary:\n  OK images: {}\n  Placeholder used: {}\n  Missing: {}\n",
        summary.ok, summary.placeholder, summary.missing
    );

    if summary.missing > 0 {
        out.push_str("\nMissing items:\n");
        for outcome in report.missing() {
            out.push_str(&format!(
                "  - {}/{}: {}\n",
                outcome.category, outcome.index, outcome.url
            ));
        }
    }

    out.push_str(&format!("\nFiles are in {}\n", output_dir.display()));
    if summary.placeholder > 0 || summary.missing > 0 {
        out.push_str(
            "Replace the URLs of placeholder or missing items in the catalog and run again.\n",
        );
    }

    out
}

/// Write the summary and every item outcome as pretty JSON
pub fn write_summary_json(
    path: &Path,
    report: &RunReport,
    output_dir: &Path,
) -> Result<(), ReportError> {
    let file = SummaryFile {
        output_dir,
        duration_sec: report.duration.as_secs_f64(),
        summary: report.summary(),
        items: &report.outcomes,
    };

    let json = serde_json::to_string_pretty(&file)?;
    fs::write(path, json).map_err(|e| ReportError::Write {
        path: path.to_path_buf(),
        source: e,
    })
}
