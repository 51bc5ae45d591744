use std::{
    fs,
    io,
    path::{Path, PathBuf},
};

use scanweb_core::poller::CompletionNotice;
use scanweb_model::{ScanRecord, ScanStats, ScanStatus};

use crate::client::ExportedReport;

/// One-line view used for listings and progress output.
pub fn status_line(record: &ScanRecord) -> String {
    let mut line = format!("{}  {:<9}  {}", record.id, record.status, record.url);
    if let Some(duration) = record.scan_duration {
        line.push_str(&format!("  {duration}s"));
    }
    if record.status == ScanStatus::Completed {
        line.push_str(&format!("  {} finding(s)", record.vulnerability_count()));
    }
    line
}

pub fn stats_line(stats: &ScanStats) -> String {
    format!(
        "{} total, {} completed, {} in progress, {} failed",
        stats.total, stats.completed, stats.in_progress, stats.failed
    )
}

/// Full report of a terminal scan.
pub fn render_record(record: &ScanRecord) -> String {
    let mut out = String::new();
    out.push_str(&status_line(record));
    out.push('\n');

    if let Some(notice) = CompletionNotice::for_record(record) {
        out.push_str(&format!("\n{}\n{}\n", notice.title, notice.body));
    } else if record.status == ScanStatus::Failed {
        out.push_str("\nScan failed: the target could not be probed.\n");
    }

    if let Some(vulnerabilities) = &record.vulnerabilities {
        out.push('\n');
        for (key, finding) in vulnerabilities {
            out.push_str(&format!(
                "[{}] {} ({key})\n  {}\n  Fix: {}\n",
                finding.severity,
                finding.finding_type,
                finding.description,
                finding.recommendation
            ));
            if let Some(details) = &finding.details {
                out.push_str(&format!("  Details: {}\n", details.join(", ")));
            }
        }
    }

    if let Some(summary) = &record.ai_summary {
        out.push('\n');
        out.push_str(summary.trim_end());
        out.push('\n');
    }

    out
}

/// Write an exported report into `dir` under the server-suggested name.
pub fn save_report(dir: &Path, report: &ExportedReport) -> io::Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(&report.file_name);
    fs::write(&path, &report.body)?;
    Ok(path)
}
