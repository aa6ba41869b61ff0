use chrono::Local;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::error::Result;
use crate::pipeline::orchestrator::FailureRecord;
use crate::types::LabelRecord;

/// Outcome summary of one enrichment run, written to a timestamped file
/// so failed labels can be chased by hand.
#[derive(Debug, Default)]
pub struct RunReport {
    pub total: usize,
    pub successes: Vec<LabelRecord>,
    pub failures: Vec<FailureRecord>,
}

impl RunReport {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn new(total: usize, successes: Vec<LabelRecord>, failures: Vec<FailureRecord>) -> Self {
        Self {
            total,
            successes,
            failures,
        }
    }

    pub fn has_activity(&self) -> bool {
        !self.successes.is_empty() || !self.failures.is_empty()
    }

    /// Writes the report under `output_dir` and returns the file path.
    pub fn write(&self, output_dir: &str) -> Result<String> {
        fs::create_dir_all(output_dir)?;
        let timestamp = Local::now().format("%Y%m%d_%H%M%S");
        let path = Path::new(output_dir).join(format!("label_report_{timestamp}.txt"));

        let mut lines = Vec::new();
        lines.push(format!(
            "Labels failed ({}/{}):",
            self.failures.len(),
            self.total
        ));
        for failure in &self.failures {
            lines.push(format!("Label: {} -> {}", failure.name, failure.reason));
        }
        lines.push(String::new());
        lines.push(format!(
            "Labels processed ({}/{}):",
            self.successes.len(),
            self.total
        ));
        for label in &self.successes {
            lines.push(format!("Label: {}", label.name));
        }
        lines.push(String::new());

        fs::write(&path, lines.join("\n"))?;
        let path = path.to_string_lossy().into_owned();
        info!(path = %path, "run report written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_lists_failures_with_reasons() {
        let dir = tempfile::tempdir().unwrap();
        let report = RunReport::new(
            2,
            vec![LabelRecord::named("Drumcode")],
            vec![FailureRecord {
                name: "Ghost Label".to_string(),
                reason: "No matching labels found".to_string(),
            }],
        );

        let path = report.write(dir.path().to_str().unwrap()).unwrap();
        let contents = fs::read_to_string(path).unwrap();
        assert!(contents.contains("Labels failed (1/2):"));
        assert!(contents.contains("Label: Ghost Label -> No matching labels found"));
        assert!(contents.contains("Labels processed (1/2):"));
        assert!(contents.contains("Label: Drumcode"));
    }

    #[test]
    fn empty_report_has_no_activity() {
        assert!(!RunReport::empty().has_activity());
    }
}
