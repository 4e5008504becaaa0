//! Output formatting

use clap::ValueEnum;
use tabled::builder::Builder;
use tabled::settings::object::Columns;
use tabled::settings::{Modify, Padding, Style};

use crate::rows::ReportRow;

const HEADER: [&str; 5] = ["NAMESPACE", "POD NAME", "CONTAINER", "CPUl", "CPUr"];
const WIDE_HEADER: [&str; 2] = ["MEMl", "MEMr"];
const CLASS_HEADER: &str = "CLASS";

/// Spaces between columns
const COLUMN_PADDING: usize = 2;

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned table (default)
    #[default]
    Table,
    /// Table with memory limit and request columns
    Wide,
    /// JSON array of rows
    Json,
}

/// Render rows in the requested format, newline terminated
pub fn render(rows: &[ReportRow], format: OutputFormat) -> serde_json::Result<String> {
    match format {
        OutputFormat::Table => Ok(render_table(rows, false)),
        OutputFormat::Wide => Ok(render_table(rows, true)),
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(rows)?;
            json.push('\n');
            Ok(json)
        }
    }
}

/// Header plus one line per row, every column but the last padded to its
/// widest cell
fn render_table(rows: &[ReportRow], wide: bool) -> String {
    let mut header: Vec<String> = HEADER.iter().map(|h| h.to_string()).collect();
    if wide {
        header.extend(WIDE_HEADER.iter().map(|h| h.to_string()));
    }
    header.push(CLASS_HEADER.to_string());

    let mut builder = Builder::default();
    builder.push_record(header);
    for row in rows {
        builder.push_record(row.cells(wide));
    }

    let mut table = builder.build();
    table
        .with(Style::empty())
        .with(Padding::new(0, COLUMN_PADDING, 0, 0))
        .with(Modify::new(Columns::last()).with(Padding::zero()));

    // The last column is still filled to its width, drop that filler
    let mut out = String::new();
    for line in table.to_string().lines() {
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use podqos_types::QosClass;

    fn row(container: &str, limit: &str, request: &str, class: QosClass) -> ReportRow {
        ReportRow {
            namespace: "default".to_string(),
            pod: "web-0".to_string(),
            container: container.to_string(),
            cpu_limit: limit.to_string(),
            cpu_request: request.to_string(),
            memory_limit: "256Mi".to_string(),
            memory_request: "128Mi".to_string(),
            class,
        }
    }

    fn rows() -> Vec<ReportRow> {
        vec![
            row("app", "1", "500m", QosClass::Burstable),
            row("sidecar", "100m", "100m", QosClass::Guaranteed),
        ]
    }

    #[test]
    fn test_table_alignment() {
        let out = render(&rows(), OutputFormat::Table).unwrap();
        assert_eq!(
            out,
            "NAMESPACE  POD NAME  CONTAINER  CPUl  CPUr  CLASS\n\
             default    web-0     app        1     500m  Burstable\n\
             default    web-0     sidecar    100m  100m  Guaranteed\n"
        );
    }

    #[test]
    fn test_wide_table_adds_memory() {
        let out = render(&rows(), OutputFormat::Wide).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next(),
            Some("NAMESPACE  POD NAME  CONTAINER  CPUl  CPUr  MEMl   MEMr   CLASS")
        );
        assert_eq!(
            lines.next(),
            Some("default    web-0     app        1     500m  256Mi  128Mi  Burstable")
        );
    }

    #[test]
    fn test_empty_table_keeps_header() {
        let out = render(&[], OutputFormat::Table).unwrap();
        assert_eq!(out, "NAMESPACE  POD NAME  CONTAINER  CPUl  CPUr  CLASS\n");
    }

    #[test]
    fn test_json_output() {
        let out = render(&rows()[..1], OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "namespace": "default",
                "pod": "web-0",
                "container": "app",
                "cpuLimit": "1",
                "cpuRequest": "500m",
                "memoryLimit": "256Mi",
                "memoryRequest": "128Mi",
                "class": "Burstable"
            }])
        );
    }

    #[test]
    fn test_empty_json_is_array() {
        let out = render(&[], OutputFormat::Json).unwrap();
        assert_eq!(out.trim(), "[]");
    }
}
