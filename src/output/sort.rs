use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::models::Record;
use crate::output::csv;
use crate::Result;

/// Names without three parseable dimensions sort after everything else.
const UNPARSED: f64 = 999_999.0;

/// Orders an export by lumber dimensions instead of page order. Product names
/// carry their size as `thickness x width x length` with feet and inch
/// markers; the sorter normalizes the markers, parses the three numbers
/// (fractions included), and sorts on the resulting triple.
pub struct DimensionSorter {
    dimensions: Regex,
    feet_suffix: Regex,
    inch_suffix: Regex,
    inch_word: Regex,
    per_each: Regex,
    whitespace: Regex,
}

impl DimensionSorter {
    pub fn new() -> Self {
        DimensionSorter {
            dimensions: Regex::new(
                r"(\d+(?:-\d+/\d+)?(?:\.\d+)?)\s*[xX]\s*(\d+(?:-\d+/\d+)?(?:\.\d+)?)\s*[xX]\s*(\d+(?:-\d+/\d+)?(?:\.\d+)?)",
            )
            .unwrap(),
            feet_suffix: Regex::new(r"(?i)-ft").unwrap(),
            inch_suffix: Regex::new(r"(?i)-inch").unwrap(),
            inch_word: Regex::new(r"(?i)\b inch\b").unwrap(),
            per_each: Regex::new(r"(?i)/ each").unwrap(),
            whitespace: Regex::new(r"\s+").unwrap(),
        }
    }

    /// Normalizes store formatting: `8-ft` becomes `8'`, inch markers and
    /// `/ each` suffixes disappear, whitespace collapses.
    pub fn clean_text(&self, text: &str) -> String {
        let text = self.feet_suffix.replace_all(text, "'");
        let text = self.inch_suffix.replace_all(&text, "");
        let text = self.inch_word.replace_all(&text, "");
        let text = self.per_each.replace_all(&text, "");
        let text = self.whitespace.replace_all(&text, " ");
        text.trim().to_string()
    }

    /// Reads a CSV export, sorts it by dimensions, and writes the cleaned
    /// rows next to the input. A file named `...unsorted...` gets the
    /// `sorted` marker; anything else gets a `-sorted` suffix, so the input
    /// is never overwritten.
    pub fn sort_file(&self, input: &Path) -> Result<PathBuf> {
        let rows = csv::read_rows(input)?;
        let output = sorted_path(input);

        let mut keyed: Vec<((f64, f64, f64), Record)> = rows
            .into_iter()
            .map(|record| (self.dimension_key(&record.name), record))
            .collect();
        // Stable sort keeps page order within equal dimensions
        keyed.sort_by(|(a, _), (b, _)| {
            a.0.total_cmp(&b.0)
                .then(a.1.total_cmp(&b.1))
                .then(a.2.total_cmp(&b.2))
        });

        let cleaned: Vec<Record> = keyed
            .into_iter()
            .map(|(_, record)| {
                Record::new(self.clean_text(&record.name), self.clean_text(&record.price))
            })
            .collect();

        csv::write_records(&output, &cleaned)?;
        info!(rows = cleaned.len(), "Sorted file written to {:?}", output);
        Ok(output)
    }

    /// `(thickness, width, length)` with the first two in ascending order,
    /// so `4 x 2` and `2 x 4` group together.
    fn dimension_key(&self, name: &str) -> (f64, f64, f64) {
        let cleaned = self.clean_text(name);
        let Some(caps) = self.dimensions.captures(&cleaned) else {
            return (UNPARSED, UNPARSED, UNPARSED);
        };

        match (
            parse_mixed_number(&caps[1]),
            parse_mixed_number(&caps[2]),
            parse_mixed_number(&caps[3]),
        ) {
            (Some(mut first), Some(mut second), Some(length)) => {
                if first > second {
                    std::mem::swap(&mut first, &mut second);
                }
                (first, second, length)
            }
            _ => (UNPARSED, UNPARSED, UNPARSED),
        }
    }
}

impl Default for DimensionSorter {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses `104-5/8`, `5/4`, `0.75`, and plain integers.
fn parse_mixed_number(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.contains('-') && s.contains('/') {
        let (whole, frac) = s.split_once('-')?;
        let (num, denom) = frac.split_once('/')?;
        let whole: f64 = whole.parse().ok()?;
        let num: f64 = num.parse().ok()?;
        let denom: f64 = denom.parse().ok()?;
        Some(whole + num / denom)
    } else if s.contains('/') {
        let (num, denom) = s.split_once('/')?;
        let num: f64 = num.parse().ok()?;
        let denom: f64 = denom.parse().ok()?;
        Some(num / denom)
    } else {
        s.parse().ok()
    }
}

pub(crate) fn sorted_path(input: &Path) -> PathBuf {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    if name.contains("unsorted") {
        return input.with_file_name(name.replace("unsorted", "sorted"));
    }

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    match input.extension() {
        Some(ext) => input.with_file_name(format!("{}-sorted.{}", stem, ext.to_string_lossy())),
        None => input.with_file_name(format!("{}-sorted", stem)),
    }
}
