use std::fs::{File, OpenOptions};
use std::io::Write;
use std::sync::Mutex;

use tracing::warn;

use crate::search::beam::SearchOutcome;
use crate::trace::trace::TraceEvent;

/// JSONL sink for search diagnostics.
pub struct TraceLogger {
    file: Option<Mutex<File>>,
}

impl TraceLogger {
    /// Append to `path`. A file that cannot be opened disables the logger.
    pub fn new(path: &str) -> Self {
        let opened = OpenOptions::new().create(true).append(true).open(path);
        if let Err(e) = &opened {
            warn!(path, error = %e, "could not open trace file, tracing disabled");
        }
        Self {
            file: opened.ok().map(Mutex::new),
        }
    }

    /// A logger that drops every event.
    pub fn disabled() -> Self {
        Self { file: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.file.is_some()
    }

    /// Append one event as a JSON line; failures are logged and dropped.
    pub fn log(&self, event: &TraceEvent) {
        let Some(file) = &self.file else {
            return;
        };

        let line = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                warn!(event = event.event, error = %e, "trace event not serializable");
                return;
            }
        };

        let written = file
            .lock()
            .map_err(|e| e.to_string())
            .and_then(|mut f| writeln!(f, "{}", line).map_err(|e| e.to_string()));
        if let Err(error) = written {
            warn!(%error, "trace event not written");
        }
    }

    /// Dump the explored score tree and the frontier size at every depth.
    pub fn log_search(&self, scenario: &str, outcome: &SearchOutcome) {
        if !self.is_enabled() {
            return;
        }

        for node in outcome.tree.nodes() {
            let mut event = TraceEvent::now("node", scenario, node.depth)
                .with_node(node.id, node.parent)
                .with_score(node.total_score);
            if let Some(page) = &node.page {
                event = event.with_page(page);
            }
            self.log(&event);
        }

        for (depth, size) in outcome.frontier_sizes.iter().enumerate() {
            self.log(&TraceEvent::now("frontier", scenario, depth).with_count(*size));
        }
    }
}
