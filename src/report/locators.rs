use std::fs;
use std::path::Path;

use crate::error::MatchError;
use crate::plan::resolved::ResolvedPlan;

/// Locator audit trail: one CSV line per resolved scenario.
///
/// Each line lists, in step order, the positional path of every element
/// chosen by search, or the value of the explicit locator a step named.
#[derive(Debug, Clone, Default)]
pub struct LocatorAudit {
    lines: Vec<String>,
}

impl LocatorAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_plan(&mut self, plan: &ResolvedPlan) {
        let paths: Vec<&str> = plan
            .steps
            .iter()
            .filter_map(|s| s.audit_path.as_deref())
            .collect();
        self.lines.push(paths.join(", "));
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn as_csv(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }

    pub fn write_to(&self, path: &Path) -> Result<(), MatchError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| MatchError::Io {
                context: format!("creating {}", parent.display()),
                source: e,
            })?;
        }
        fs::write(path, self.as_csv()).map_err(|e| MatchError::Io {
            context: format!("writing {}", path.display()),
            source: e,
        })
    }
}
