//! Build report types and terminal formatting.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// What one `build_session` run produced.
#[derive(Clone, Debug, Default, Serialize)]
pub struct BuildReport {
    pub session_id: String,
    pub session_dir: PathBuf,
    /// Images asked for.
    pub images_requested: usize,
    /// Images written to disk with their annotation.
    pub images_generated: usize,
    /// Images that failed to render or save and were left out.
    pub images_skipped: usize,
    /// Images that received fewer circles than their target.
    pub images_short: usize,
    /// Circles placed across every generated image.
    pub circles_placed: usize,
    pub training: ContainerSummary,
    pub validation: ContainerSummary,
    /// Set when the run stopped early on request.
    pub cancelled: bool,
}

/// Counts for one written container.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ContainerSummary {
    pub path: PathBuf,
    /// Identifiers listed in the subset manifest.
    pub listed: usize,
    /// Records framed into the container.
    pub records: u64,
    /// Listed identifiers whose image or annotation could not be packed.
    pub skipped: usize,
    /// Container size in bytes.
    pub bytes: u64,
}

impl BuildReport {
    pub fn records_written(&self) -> u64 {
        self.training.records + self.validation.records
    }
}

impl fmt::Display for BuildReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Session {}", self.session_id)?;
        writeln!(f, "  directory: {}", self.session_dir.display())?;
        writeln!(
            f,
            "  {} of {} images generated, {} circles",
            self.images_generated, self.images_requested, self.circles_placed
        )?;
        if self.images_short > 0 {
            writeln!(f, "  {} images received fewer circles than requested", self.images_short)?;
        }
        if self.images_skipped > 0 {
            writeln!(f, "  {} images skipped", self.images_skipped)?;
        }

        writeln!(f)?;
        writeln!(f, "Containers:")?;
        fmt_container(f, "training", &self.training)?;
        fmt_container(f, "validation", &self.validation)?;

        if self.cancelled {
            writeln!(f)?;
            writeln!(f, "Cancelled before completion; containers hold the records written so far.")?;
        }
        Ok(())
    }
}

fn fmt_container(f: &mut fmt::Formatter<'_>, name: &str, summary: &ContainerSummary) -> fmt::Result {
    write!(
        f,
        "  {name:<10} {} records ({} bytes) -> {}",
        summary.records,
        summary.bytes,
        summary.path.display()
    )?;
    if summary.skipped > 0 {
        write!(f, ", {} of {} listed skipped", summary.skipped, summary.listed)?;
    }
    writeln!(f)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_skips_only_when_present() {
        let mut report = BuildReport {
            session_id: "abc".to_string(),
            images_requested: 4,
            images_generated: 4,
            circles_placed: 9,
            ..Default::default()
        };
        let text = report.to_string();
        assert!(text.contains("4 of 4 images generated, 9 circles"));
        assert!(!text.contains("skipped"));

        report.validation.listed = 2;
        report.validation.skipped = 1;
        assert!(report.to_string().contains("1 of 2 listed skipped"));
    }

    #[test]
    fn serializes_to_json() {
        let report = BuildReport {
            session_id: "abc".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&report).expect("serialize report");
        assert_eq!(json["session_id"], "abc");
        assert_eq!(json["training"]["records"], 0);
    }
}
