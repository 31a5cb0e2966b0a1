//! HTML audit report
//!
//! Renders every action record of a run into one self-contained HTML file
//! with a per-category summary. The file is replaced on every run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::error::ReportWriteError;
use crate::models::ActionRecord;
use crate::services::action_executor::RunMode;
use crate::services::tally::Tally;

const TEMPLATE: &str = include_str!("../templates/report.html");

/// Run details shown in the report header
#[derive(Debug, Clone, Serialize)]
pub struct ReportMeta {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub mode: RunMode,
    pub media_root: PathBuf,
    pub backup_root: PathBuf,
}

impl ReportMeta {
    /// Metadata for a run starting now
    pub fn new(mode: RunMode, media_root: &Path, backup_root: &Path) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            mode,
            media_root: media_root.to_path_buf(),
            backup_root: backup_root.to_path_buf(),
        }
    }
}

/// Write the report to `path`, replacing any previous one
pub fn write_report(
    path: &Path,
    records: &[ActionRecord],
    tally: &Tally,
    meta: &ReportMeta,
) -> Result<(), ReportWriteError> {
    let html = render(records, tally, meta)?;

    if path.exists() {
        fs::remove_file(path)
            .map_err(|e| ReportWriteError::RemovePrevious(path.to_path_buf(), e))?;
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| ReportWriteError::Write(path.to_path_buf(), e))?;
    }
    fs::write(path, html).map_err(|e| ReportWriteError::Write(path.to_path_buf(), e))?;

    info!("Report written to {} ({} actions)", path.display(), records.len());
    Ok(())
}

/// Render the report document
pub fn render(
    records: &[ActionRecord],
    tally: &Tally,
    meta: &ReportMeta,
) -> Result<String, ReportWriteError> {
    let summary_json = build_summary_json(tally, meta)?;
    let timestamp = meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC").to_string();
    let record_count = records.len().to_string();

    Ok(fill_template(
        TEMPLATE,
        &[
            ("RUN_ID", meta.run_id.to_string()),
            ("TIMESTAMP", timestamp),
            ("MODE", meta.mode.to_string()),
            ("MEDIA_ROOT", escape_html(&meta.media_root.to_string_lossy())),
            ("BACKUP_ROOT", escape_html(&meta.backup_root.to_string_lossy())),
            ("SUMMARY_ROWS", build_summary_rows(tally)),
            ("TABLE_ROWS", build_table_rows(records)),
            ("RECORD_COUNT", record_count),
            ("SUMMARY_JSON", summary_json),
        ],
    ))
}

/// Substitute `{{KEY}}` placeholders in one pass
///
/// Substituted text is never rescanned; unknown placeholders are kept.
fn fill_template(template: &str, values: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let value = after.find("}}").and_then(|end| {
            let key = &after[..end];
            values
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| (v, end))
        });
        match value {
            Some((v, end)) => {
                out.push_str(v);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("{{");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn build_summary_rows(tally: &Tally) -> String {
    let rows = tally
        .by_category
        .iter()
        .map(|(category, counts)| (category.as_str(), counts))
        .chain(std::iter::once(("Total", &tally.total)));

    let mut html = String::new();
    for (name, c) in rows {
        html.push_str(&format!(
            r#"    <tr><td>{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td><td class="num">{}</td></tr>"#,
            escape_html(name),
            c.processed,
            c.linked,
            c.renamed,
            c.backed_up,
            c.left
        ));
        html.push('\n');
    }
    html
}

fn build_table_rows(records: &[ActionRecord]) -> String {
    let mut html = String::new();
    for record in records {
        // Reasons without a confidence sort below every number
        let sort_key = record.label.confidence().unwrap_or(-1.0);
        html.push_str(&format!(
            r#"    <tr><td>{kind}</td><td>{canonical}</td><td class="path">{source}</td><td class="path">{destination}</td><td class="num" data-sort="{sort_key:.4}">{label}<span class="badge badge-{outcome}">{outcome}</span></td></tr>"#,
            kind = record.kind,
            canonical = escape_html(record.canonical_name.as_deref().unwrap_or("")),
            source = escape_html(&record.source.to_string_lossy()),
            destination = escape_html(&record.destination.to_string_lossy()),
            sort_key = sort_key,
            label = escape_html(&record.label.to_string()),
            outcome = record.outcome,
        ));
        html.push('\n');
    }
    html
}

/// Machine-readable copy of the header and summary table
#[derive(Serialize)]
struct ReportSummary<'a> {
    run: &'a ReportMeta,
    tally: &'a Tally,
}

fn build_summary_json(tally: &Tally, meta: &ReportMeta) -> Result<String, ReportWriteError> {
    let json = serde_json::to_string(&ReportSummary { run: meta, tally })?;

    // Keep "</script>" inside the data from closing the script element
    Ok(json.replace('<', "\\u003c").replace('>', "\\u003e"))
}

/// Escape text for HTML element and attribute content
pub fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ActionKind, ActionLabel, Outcome};

    fn meta(media_root: &str) -> ReportMeta {
        ReportMeta::new(RunMode::Simulate, Path::new(media_root), Path::new("/backup"))
    }

    fn record(canonical: &str, source: &str, label: ActionLabel, outcome: Outcome) -> ActionRecord {
        ActionRecord {
            kind: ActionKind::Rename,
            canonical_name: Some(canonical.to_string()),
            source: PathBuf::from(source),
            destination: PathBuf::from("/media/Wheel/out.png"),
            label,
            outcome,
        }
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#x27;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn test_fill_template_single_pass() {
        let out = fill_template(
            "a {{X}} b {{Y}} {{UNKNOWN}} {{",
            &[("X", "{{Y}}".to_string()), ("Y", "y".to_string())],
        );
        assert_eq!(out, "a {{Y}} b y {{UNKNOWN}} {{");
    }

    #[test]
    fn test_rows_are_escaped() {
        let records = vec![record(
            "<script>alert(1)</script>",
            "/media/Wheel/Tom & Jerry.png",
            ActionLabel::Confidence(97.5),
            Outcome::Renamed,
        )];
        let html = render(&records, &Tally::from_outcomes(&[]), &meta("/media")).unwrap();

        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(html.contains("/media/Wheel/Tom &amp; Jerry.png"));
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains(r#"data-sort="97.5000""#));
        assert!(html.contains("97.50%"));
    }

    #[test]
    fn test_summary_json_cannot_close_script() {
        let meta = meta("/media/</script><b>");
        let html = render(&[], &Tally::from_outcomes(&[]), &meta).unwrap();
        assert!(html.contains(r"/media/\u003c/script\u003e\u003cb\u003e"));
        assert!(html.contains("/media/&lt;/script&gt;&lt;b&gt;"));
        assert_eq!(html.matches("</script>").count(), 2);
    }

    #[test]
    fn test_reason_rows_sort_last() {
        let records = vec![record(
            "",
            "/media/a.png",
            ActionLabel::NoCloseMatches,
            Outcome::BackedUp,
        )];
        let html = render(&records, &Tally::from_outcomes(&[]), &meta("/media")).unwrap();
        assert!(html.contains(r#"data-sort="-1.0000""#));
        assert!(html.contains("no close matches found"));
    }
}
