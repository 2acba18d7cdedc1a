//! Text output formatter

use std::fmt::Write;

use valet_document::Summary;

use crate::commands::FileReport;

pub fn output_text(reports: &[FileReport]) {
    print!("{}", render_text(reports));
}

fn render_text(reports: &[FileReport]) -> String {
    let mut out = String::new();

    for report in reports {
        if report.findings.is_empty() {
            continue;
        }

        let _ = writeln!(out, "\n{}:", report.path.display());
        for finding in &report.findings {
            let _ = writeln!(
                out,
                "  {}:{} {} [{}]: {}",
                finding.line, finding.span[0], finding.severity, finding.check, finding.message
            );
        }
    }

    let summary = Summary::from_findings(reports.iter().flat_map(|r| &r.findings));
    let _ = writeln!(out, "\nChecked {} files: {}", reports.len(), summary);
    out
}
