//! Output formatting for the CLI.

use crate::config::OutputFormat;
use crate::error::Result;
use colored::*;
use nfse_domain::{Category, ClassifiedRecord};
use nfse_extractor::{BatchIssue, BatchOutcome, BatchSummary};
use tabled::{
    builder::Builder,
    settings::{object::Rows, Alignment, Modify, Style},
};

/// Output formatter.
pub struct Formatter {
    format: OutputFormat,
    color_enabled: bool,
}

impl Formatter {
    /// Create a new formatter.
    pub fn new(format: OutputFormat, color_enabled: bool) -> Self {
        Self {
            format,
            color_enabled,
        }
    }

    /// Selected output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format the result of a batch, optionally limited to one category.
    pub fn format_outcome(
        &self,
        outcome: &BatchOutcome,
        category: Option<Category>,
    ) -> Result<String> {
        let records: Vec<&ClassifiedRecord> = outcome
            .records
            .iter()
            .filter(|r| category.map_or(true, |c| r.category == c))
            .collect();

        match self.format {
            OutputFormat::Json => self.format_outcome_json(outcome, &records),
            OutputFormat::Table => Ok(self.format_outcome_table(outcome, &records, category)),
            OutputFormat::Quiet => Ok(self.format_records_quiet(&records)),
        }
    }

    fn format_outcome_json(
        &self,
        outcome: &BatchOutcome,
        records: &[&ClassifiedRecord],
    ) -> Result<String> {
        let json_records: Vec<serde_json::Value> = records
            .iter()
            .map(|r| {
                serde_json::json!({
                    "display_name": r.display_name,
                    "category": r.category,
                    "source_file_name": r.source_file_name,
                    "size": r.content.len(),
                })
            })
            .collect();

        let value = serde_json::json!({
            "run_id": outcome.run_id.to_string(),
            "summary": outcome.summary,
            "records": json_records,
            "issues": outcome.issues,
        });

        Ok(serde_json::to_string_pretty(&value)?)
    }

    fn format_outcome_table(
        &self,
        outcome: &BatchOutcome,
        records: &[&ClassifiedRecord],
        category: Option<Category>,
    ) -> String {
        let mut sections = Vec::new();

        let categories: Vec<Category> = match category {
            Some(c) => vec![c],
            None => Category::ALL.to_vec(),
        };
        for category in categories {
            let in_category: Vec<&ClassifiedRecord> = records
                .iter()
                .copied()
                .filter(|r| r.category == category)
                .collect();
            let title = format!("{} ({})", category.title(), in_category.len());
            sections.push(self.colorize(&title, category_color(category)));
            sections.push(self.format_records_table(&in_category));
        }

        sections.push(self.format_summary(&outcome.summary));
        if !outcome.issues.is_empty() {
            sections.push(self.format_issues(&outcome.issues));
        }

        sections.join("\n")
    }

    /// Format records as a table.
    pub fn format_records_table(&self, records: &[&ClassifiedRecord]) -> String {
        if records.is_empty() {
            return self.colorize("No notes.", "yellow");
        }

        let mut builder = Builder::default();
        builder.push_record(["#", "Name", "Source", "Size"]);

        for (i, record) in records.iter().enumerate() {
            builder.push_record([
                (i + 1).to_string(),
                record.display_name.clone(),
                record.source_file_name.clone(),
                format_size(record.content.len()),
            ]);
        }

        let mut table = builder.build();
        table
            .with(Style::rounded())
            .with(Modify::new(Rows::first()).with(Alignment::center()));

        table.to_string()
    }

    /// Format records in quiet mode (display names only).
    fn format_records_quiet(&self, records: &[&ClassifiedRecord]) -> String {
        let names: Vec<&str> = records.iter().map(|r| r.display_name.as_str()).collect();
        names.join("\n")
    }

    /// Format the batch summary line.
    pub fn format_summary(&self, summary: &BatchSummary) -> String {
        if summary.errors > 0 {
            self.warning(&summary.summary())
        } else {
            self.success(&summary.summary())
        }
    }

    /// Format the issue list, errors in red and warnings in yellow.
    pub fn format_issues(&self, issues: &[BatchIssue]) -> String {
        issues
            .iter()
            .map(|issue| {
                if issue.is_warning() {
                    self.warning(&issue.to_string())
                } else {
                    self.error(&issue.to_string())
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Format a success message.
    pub fn success(&self, message: &str) -> String {
        self.colorize(&format!("✓ {}", message), "green")
    }

    /// Format an error message.
    pub fn error(&self, message: &str) -> String {
        self.colorize(&format!("✗ {}", message), "red")
    }

    /// Format an info message.
    pub fn info(&self, message: &str) -> String {
        self.colorize(&format!("ℹ {}", message), "blue")
    }

    /// Format a warning message.
    pub fn warning(&self, message: &str) -> String {
        self.colorize(&format!("⚠ {}", message), "yellow")
    }

    /// Format export result.
    pub fn exported(&self, count: usize, target: &str) -> String {
        self.success(&format!("Exported {} note(s) to {}", count, target))
    }

    /// Colorize text if color is enabled.
    fn colorize(&self, text: &str, color: &str) -> String {
        if !self.color_enabled {
            return text.to_string();
        }

        match color {
            "red" => text.red().to_string(),
            "green" => text.green().to_string(),
            "blue" => text.blue().to_string(),
            "yellow" => text.yellow().to_string(),
            "cyan" => text.cyan().to_string(),
            "magenta" => text.magenta().to_string(),
            _ => text.to_string(),
        }
    }
}

fn category_color(category: Category) -> &'static str {
    match category {
        Category::Tomador => "cyan",
        Category::Prestador => "magenta",
        Category::SemCategoria => "yellow",
    }
}

fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} KiB", bytes as f64 / 1024.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nfse_domain::RunId;

    fn record(name: &str, category: Category) -> ClassifiedRecord {
        ClassifiedRecord {
            display_name: name.to_string(),
            content: "<Nfse></Nfse>".to_string(),
            category,
            source_file_name: "lote.xml".to_string(),
        }
    }

    fn create_test_outcome() -> BatchOutcome {
        let records = vec![
            record("lote_1.xml", Category::Tomador),
            record("lote_2.xml", Category::Prestador),
        ];
        let issues = vec![BatchIssue::NoRecords {
            file: "vazio.xml".to_string(),
        }];
        BatchOutcome {
            run_id: RunId::new(),
            summary: BatchSummary::tally(2, 2, &records, &issues),
            records,
            issues,
        }
    }

    #[test]
    fn test_json_format() {
        let formatter = Formatter::new(OutputFormat::Json, false);
        let output = formatter.format_outcome(&create_test_outcome(), None).unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["records"].as_array().unwrap().len(), 2);
        assert_eq!(value["records"][0]["category"], "tomador");
        assert_eq!(value["summary"]["warnings"], 1);
        assert_eq!(value["issues"][0]["kind"], "no_records");
    }

    #[test]
    fn test_quiet_format_filters_category() {
        let formatter = Formatter::new(OutputFormat::Quiet, false);
        let output = formatter
            .format_outcome(&create_test_outcome(), Some(Category::Prestador))
            .unwrap();
        assert_eq!(output, "lote_2.xml");
    }

    #[test]
    fn test_table_format() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        let output = formatter.format_outcome(&create_test_outcome(), None).unwrap();
        assert!(output.contains("ISS - Tomador (1)"));
        assert!(output.contains("ISS - Prestador (1)"));
        assert!(output.contains("Sem Categoria (0)"));
        assert!(output.contains("lote_1.xml"));
        assert!(output.contains("⚠ vazio.xml"));
    }

    #[test]
    fn test_empty_records() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert!(formatter.format_records_table(&[]).contains("No notes"));
    }

    #[test]
    fn test_colorize_disabled() {
        let formatter = Formatter::new(OutputFormat::Table, false);
        assert_eq!(formatter.success("test"), "✓ test");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KiB");
    }
}
