//! Convergence history CSV (`evaluations,best`, one row per generation).

use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::domain::HistoryRow;
use crate::error::AppError;

pub fn read_history_csv(path: &Path) -> Result<Vec<HistoryRow>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open history CSV '{}': {e}", path.display())))?;
    read_history(file)
}

/// Rows in file order; an empty history is a "no data" error.
pub fn read_history<R: Read>(reader: R) -> Result<Vec<HistoryRow>, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut rows = Vec::new();
    for (idx, result) in reader.deserialize::<HistoryRow>().enumerate() {
        // +2: 1-based lines, header on line 1
        let row = result.map_err(|e| AppError::new(2, format!("History CSV line {}: {e}", idx + 2)))?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(AppError::new(3, "History CSV has no rows."));
    }
    Ok(rows)
}
