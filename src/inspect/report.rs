//! Inspect report types and terminal formatting.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// The result of walking one container.
#[derive(Clone, Debug, Default, Serialize)]
pub struct InspectReport {
    pub path: PathBuf,
    /// Intact frames read.
    pub records: u64,
    /// Sum of payload sizes, excluding framing.
    pub payload_bytes: u64,
    /// Records that decoded into a complete training example.
    pub examples: usize,
    /// Records whose payload is not a valid feature map.
    pub malformed: usize,
    /// Records that decoded but lack required keys or have ragged box lists.
    pub invalid: usize,
    pub total_boxes: usize,
    /// Distinct image sizes seen, as `(width, height, count)`.
    pub image_sizes: Vec<ImageSizeCount>,
    /// Box counts per class text, most frequent first.
    pub labels: Vec<LabelCount>,
    /// Display-only option for histogram rendering width.
    #[serde(skip)]
    pub(crate) bar_width: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LabelCount {
    pub label: String,
    pub count: usize,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ImageSizeCount {
    pub width: u32,
    pub height: u32,
    pub count: usize,
}

impl InspectReport {
    pub fn boxes_per_example(&self) -> f64 {
        if self.examples == 0 {
            0.0
        } else {
            self.total_boxes as f64 / self.examples as f64
        }
    }
}

impl fmt::Display for InspectReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Container: {}", self.path.display())?;
        writeln!(f)?;
        writeln!(f, "  Records:       {:>8}", self.records)?;
        writeln!(f, "  Payload bytes: {:>8}", self.payload_bytes)?;
        writeln!(f, "  Examples:      {:>8}", self.examples)?;
        if self.malformed > 0 {
            writeln!(f, "  Malformed:     {:>8}", self.malformed)?;
        }
        if self.invalid > 0 {
            writeln!(f, "  Invalid:       {:>8}", self.invalid)?;
        }
        writeln!(
            f,
            "  Boxes:         {:>8} ({:.2} per example)",
            self.total_boxes,
            self.boxes_per_example()
        )?;

        if !self.image_sizes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Image sizes:")?;
            for size in &self.image_sizes {
                writeln!(f, "  {:>5}x{:<5} {:>7}", size.width, size.height, size.count)?;
            }
        }

        writeln!(f)?;
        writeln!(f, "Labels ({}):", self.labels.len())?;
        if self.labels.is_empty() {
            writeln!(f, "  No boxes found.")?;
        } else {
            let max_count = self.labels.iter().map(|l| l.count).max().unwrap_or(1);
            for entry in &self.labels {
                let pct = if self.total_boxes > 0 {
                    (entry.count as f64 / self.total_boxes as f64) * 100.0
                } else {
                    0.0
                };
                writeln!(
                    f,
                    "  {:<16} {:>7} {:>5.1}%  {}",
                    truncate_label(&entry.label, 16),
                    entry.count,
                    pct,
                    render_bar(entry.count, max_count, self.bar_width)
                )?;
            }
        }
        Ok(())
    }
}

fn render_bar(count: usize, max_count: usize, width: usize) -> String {
    if max_count == 0 || width == 0 {
        return String::new();
    }
    let filled = ((count as f64 / max_count as f64) * width as f64).round() as usize;
    "█".repeat(filled.clamp(1, width))
}

fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        label.to_string()
    } else {
        let kept: String = label.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}
