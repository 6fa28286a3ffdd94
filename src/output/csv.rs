use std::fs;
use std::path::{Path, PathBuf};

use crate::models::Record;
use crate::Result;

pub const CSV_HEADER: &str = "product_name,price";

/// Downstream consumers of these exports split on commas without unquoting,
/// so commas inside a field are flattened to spaces instead of quoted.
pub fn sanitize(field: &str) -> String {
    field.replace(',', " ")
}

pub fn write_records(path: &Path, records: &[Record]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut out = String::with_capacity(CSV_HEADER.len() + 1 + records.len() * 32);
    out.push_str(CSV_HEADER);
    out.push('\n');
    for record in records {
        out.push_str(&sanitize(&record.name));
        out.push(',');
        out.push_str(&sanitize(&record.price));
        out.push('\n');
    }

    fs::write(path, out)?;
    Ok(())
}

pub fn read_rows(path: &Path) -> Result<Vec<Record>> {
    let content = fs::read_to_string(path)?;
    let mut rows = Vec::new();
    for line in content.lines().skip(1) {
        if line.trim().is_empty() {
            continue;
        }
        let (name, price) = line.split_once(',').unwrap_or((line, ""));
        rows.push(Record::new(name, price));
    }
    Ok(rows)
}

/// Default export location: `<dir>/<run_id>-unsorted-<date>.csv`. The sorter
/// derives its output name from the `unsorted` marker.
pub fn dated_output_path(dir: &str, run_id: &str) -> PathBuf {
    let date = chrono::Local::now().format("%Y-%m-%d");
    Path::new(dir).join(format!("{}-unsorted-{}.csv", run_id, date))
}
