//! Output rendering and formatting

use comfy_table::{
    presets::UTF8_FULL, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table,
};
use console::{Style, Term};
use lnf_ops::{ClassifyReport, ExplainReport, InventoryReport, OperationResult, RunSummary};
use lnf_types::{ColorChoice, DecisionKind};
use std::io;

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_table(result)
        }
    }

    /// Render as JSON
    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = result.to_json().map_err(io::Error::other)?;
        self.term.write_line(&json)
    }

    /// Render as formatted table
    fn render_table(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::RunSummary(summary) => self.render_run_summary(summary),
            OperationResult::Inventory(report) => self.render_inventory(report),
            OperationResult::Explain(report) => self.render_explain(report),
            OperationResult::Classification(report) => self.render_classification(report),
        }
    }

    /// Render decisions per kind and the artifacts they went to
    fn render_run_summary(&self, summary: &RunSummary) -> io::Result<()> {
        self.term.write_line(&format!(
            "{} {} orphans from {} ({})",
            self.style_heading("Resolved"),
            summary.orphans,
            summary.holding_collection,
            summary.source.as_str()
        ))?;

        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec![
            Cell::new("Decision").add_attribute(Attribute::Bold),
            Cell::new("Orphans").add_attribute(Attribute::Bold),
        ]);

        for kind in DecisionKind::ALL {
            table.add_row(vec![
                self.decision_cell(kind),
                Cell::new(summary.count(kind)).set_alignment(CellAlignment::Right),
            ]);
        }
        self.term.write_line(&table.to_string())?;

        self.term.write_line(&format!(
            "Script lines: {}  Kept: {}  Still lost: {}",
            summary.sinks.script, summary.sinks.kept, summary.sinks.still_lost
        ))?;
        if summary.read_failures > 0 {
            self.term.write_line(&format!(
                "Store read failures: {} (affected orphans fell through to later steps)",
                summary.read_failures
            ))?;
        }
        self.term.write_line(&format!(
            "Workers: {}  Duration: {}ms  Run: {}",
            summary.workers, summary.duration_ms, summary.run_id
        ))
    }

    fn render_inventory(&self, report: &InventoryReport) -> io::Result<()> {
        self.term.write_line(&format!(
            "{} orphans in {}",
            report.orphans, report.holding_collection
        ))?;
        self.term
            .write_line(&format!("Source:     {}", report.source.as_str()))?;
        self.term
            .write_line(&format!("Checkpoint: {}", report.checkpoint.display()))
    }

    fn render_explain(&self, report: &ExplainReport) -> io::Result<()> {
        self.term.write_line(&self.style_heading(&report.orphan))?;
        let technology = report
            .technology
            .map_or_else(|| "-".to_string(), |tech| tech.to_string());
        self.term.write_line(&format!("Technology: {technology}"))?;
        self.term
            .write_line(&format!("Decision:   {}", report.decision.as_str()))?;
        if report.read_failures > 0 {
            self.term
                .write_line(&format!("Read failures: {}", report.read_failures))?;
        }
        self.term.write_line(&format!("Would append to {}:", report.sink))?;
        self.term.write_line(&format!("  {}", report.line))
    }

    fn render_classification(&self, report: &ClassifyReport) -> io::Result<()> {
        match report.technology {
            Some(tech) => self.term.write_line(&tech.to_string())?,
            None => self.term.write_line("unclassified")?,
        }
        if report.run_folder_route {
            self.term.write_line("Run folder templates apply")?;
        }
        Ok(())
    }

    /// Format a decision kind as a colored cell
    fn decision_cell(&self, kind: DecisionKind) -> Cell {
        let cell = Cell::new(kind.as_str());
        if !self.supports_color() {
            return cell;
        }
        match kind {
            DecisionKind::Remove => cell.fg(Color::Green),
            DecisionKind::Move => cell.fg(Color::Blue),
            DecisionKind::KeepChecksumMismatch
            | DecisionKind::KeepMetadataMissing
            | DecisionKind::KeepAmbiguous => cell.fg(Color::Yellow),
            DecisionKind::StillLost => cell.fg(Color::Red),
        }
    }

    fn style_heading(&self, text: &str) -> String {
        if self.supports_color() {
            Style::new().bold().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Check if color output is supported
    fn supports_color(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }
}
