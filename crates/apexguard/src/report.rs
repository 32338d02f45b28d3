//! HTML report rendering.
//!
//! One self-contained document: summary stats, auto-fixed issues, issues
//! needing manual action, and a per-file table. Everything interpolated
//! from scanned content passes through [`escape_html`].

use std::collections::BTreeMap;

use apexguard_domain::RuleCatalog;
use apexguard_types::{ScanReceipt, Violation};

const STYLE: &str = "\
body{font-family:Arial,sans-serif;margin:20px;background:#e9ecef}\
h1{color:#fff;background:#495057;padding:20px;margin:0}\
h2{color:#343a40;border-bottom:2px solid #6c757d;padding-bottom:5px}\
.container{max-width:1200px;margin:auto;background:#fff;padding:20px;box-shadow:0 0 10px rgba(0,0,0,0.1)}\
table{width:100%;border-collapse:collapse;margin:20px 0}\
th{background:#6c757d;color:#fff;padding:10px;text-align:left}\
td{padding:10px;border-bottom:1px solid #dee2e6}\
.fixed{background:#d4edda;border-left:4px solid #28a745;padding:10px;margin:10px 0}\
.manual{background:#fff3cd;border-left:4px solid #ffc107;padding:10px;margin:10px 0}\
.stat{display:inline-block;margin:10px 20px 10px 0;padding:10px 15px;background:#f8f9fa;border-left:3px solid #007bff}\
.stat strong{display:block;font-size:24px;color:#007bff}\
pre{background:#212529;color:#f8f9fa;padding:10px;overflow-x:auto}";

pub fn render_html(catalog: &RuleCatalog, receipt: &ScanReceipt) -> String {
    let stats = &receipt.stats;
    let remaining = stats.total_violations - stats.fixed_violations;
    let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");

    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    out.push_str("<title>Apex Analysis Report</title>\n");
    out.push_str(&format!("<style>{STYLE}</style>\n</head>\n<body>\n"));
    out.push_str("<h1>Salesforce Apex Static Analysis Report</h1>\n");
    out.push_str("<div class=\"container\">\n");
    out.push_str(&format!("<p><strong>Generated:</strong> {timestamp}</p>\n"));

    out.push_str("\n<h2>Summary</h2>\n");
    out.push_str(&stat_box(stats.files_scanned, "Files Scanned"));
    out.push_str(&stat_box(stats.total_violations, "Total Violations"));
    out.push_str(&stat_box(stats.fixed_violations, "Auto-Fixed"));
    out.push_str(&stat_box(remaining, "Remaining"));

    out.push_str("\n<h2>Auto-Fixed Issues</h2>\n");
    out.push_str(&render_fixed_issues(&receipt.violations));

    out.push_str("\n<h2>Manual Action Required</h2>\n");
    out.push_str(&render_manual_issues(catalog, &receipt.violations));

    out.push_str("\n<h2>File Summary</h2>\n");
    out.push_str(&render_file_table(&receipt.violations));

    out.push_str("\n<hr>\n<p style=\"text-align:center;color:#6c757d\">");
    out.push_str(&format!(
        "{} v{}</p>\n</div>\n</body>\n</html>\n",
        escape_html(&receipt.tool.name),
        escape_html(&receipt.tool.version)
    ));
    out
}

fn stat_box(value: u32, label: &str) -> String {
    format!("<div class=\"stat\"><strong>{value}</strong>{label}</div>\n")
}

fn render_fixed_issues(violations: &[Violation]) -> String {
    let fixed: Vec<&Violation> = violations.iter().filter(|v| v.fixed).collect();
    if fixed.is_empty() {
        return "<p>No issues were automatically fixed.</p>\n".to_string();
    }

    let mut out = String::new();
    for v in fixed {
        out.push_str(&format!(
            "<div class=\"fixed\"><strong>{}</strong> - {}:{}<br>{}<pre>{}</pre><em>Fix: {}</em></div>\n",
            escape_html(&v.rule_id),
            escape_html(&v.file_path),
            v.line_number,
            escape_html(&v.description),
            escape_html(&v.code_snippet),
            escape_html(&v.fix_description),
        ));
    }
    out
}

fn render_manual_issues(catalog: &RuleCatalog, violations: &[Violation]) -> String {
    let manual: Vec<&Violation> = violations.iter().filter(|v| !v.fixed).collect();
    if manual.is_empty() {
        return "<p>All auto-fixable issues have been resolved!</p>\n".to_string();
    }

    let mut out = String::new();
    for v in manual {
        let guidance = catalog
            .lookup(&v.rule_id)
            .map(|r| r.remediation_guidance)
            .unwrap_or("Manual review required");
        out.push_str(&format!(
            "<div class=\"manual\"><strong>{}</strong> ({}) - {}:{}<br>{}<pre>{}</pre><em>Action: {}</em></div>\n",
            escape_html(&v.rule_id),
            v.severity.as_str(),
            escape_html(&v.file_path),
            v.line_number,
            escape_html(&v.description),
            escape_html(&v.code_snippet),
            escape_html(guidance),
        ));
    }
    out
}

fn render_file_table(violations: &[Violation]) -> String {
    // (fixed, total) per file, path-sorted.
    let mut per_file: BTreeMap<&str, (u32, u32)> = BTreeMap::new();
    for v in violations {
        let entry = per_file.entry(&v.file_path).or_default();
        if v.fixed {
            entry.0 += 1;
        }
        entry.1 += 1;
    }

    let mut out = String::new();
    out.push_str(
        "<table><thead><tr><th>File</th><th>Fixed</th><th>Remaining</th><th>Total</th></tr></thead><tbody>\n",
    );
    for (path, (fixed, total)) in per_file {
        out.push_str(&format!(
            "<tr><td>{}</td><td>{fixed}</td><td>{}</td><td>{total}</td></tr>\n",
            escape_html(path),
            total - fixed,
        ));
    }
    out.push_str("</tbody></table>\n");
    out
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
