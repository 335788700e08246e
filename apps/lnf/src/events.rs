//! Event handling and console status lines

use console::{Style, Term};
use lnf_events::{AppEvent, EventMessage, GeneralEvent, InventoryEvent, RunEvent};

/// Orphans between two progress lines
const PROGRESS_INTERVAL: u64 = 1000;

/// Event handler for status display and user feedback
pub struct EventHandler {
    /// Terminal used for status lines; stdout stays reserved for results
    term: Term,
    colors_enabled: bool,
    /// Status lines are suppressed entirely in JSON mode
    quiet: bool,
}

impl EventHandler {
    pub fn new(colors_enabled: bool, quiet: bool) -> Self {
        Self {
            term: Term::stderr(),
            colors_enabled,
            quiet,
        }
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: EventMessage) {
        crate::logging::log_event_with_tracing(&message);
        if self.quiet {
            return;
        }

        match message.event {
            AppEvent::General(GeneralEvent::Warning { message, context }) => match context {
                Some(context) => self.show_warning(&format!("{message} ({context})")),
                None => self.show_warning(&message),
            },
            AppEvent::General(GeneralEvent::Error { message, .. }) => self.show_error(&message),

            AppEvent::Inventory(InventoryEvent::TraversalStarted { collection, .. }) => {
                self.show_status(&format!("Traversing {collection}"));
            }
            AppEvent::Inventory(InventoryEvent::CheckpointReplayed {
                checkpoint,
                entries,
            }) => {
                self.show_status(&format!(
                    "Replaying {entries} orphans from {}",
                    checkpoint.display()
                ));
            }
            AppEvent::Inventory(InventoryEvent::CheckpointIncomplete { checkpoint, .. }) => {
                self.show_warning(&format!(
                    "{} was left by an interrupted traversal; delete it to traverse again",
                    checkpoint.display()
                ));
            }

            AppEvent::Run(RunEvent::Started {
                holding_collection,
                workers,
            }) => {
                self.show_status(&format!(
                    "Resolving orphans in {holding_collection} with {workers} workers"
                ));
            }
            AppEvent::Run(RunEvent::OrphanRecorded { processed })
                if processed % PROGRESS_INTERVAL == 0 =>
            {
                self.show_status(&format!("{processed} orphans decided"));
            }
            AppEvent::Run(RunEvent::Failed { failure }) => {
                self.show_error(&format!("Run failed: {}", failure.message));
            }

            // Everything else only goes to the log
            _ => {}
        }
    }

    fn show_status(&self, message: &str) {
        let _ = self.term.write_line(message);
    }

    fn show_warning(&self, message: &str) {
        let line = format!("warning: {message}");
        let _ = self.term.write_line(&self.paint(&Style::new().yellow(), &line));
    }

    fn show_error(&self, message: &str) {
        let line = format!("error: {message}");
        let _ = self.term.write_line(&self.paint(&Style::new().red().bold(), &line));
    }

    fn paint(&self, style: &Style, text: &str) -> String {
        if self.colors_enabled {
            style.apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}
