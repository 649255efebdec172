//! Genome text: comma-separated genes, one genome per line in files.

use std::fs;
use std::path::Path;

use crate::error::{AppError, FilterError};

/// Parse `g0,g1,...`; whitespace around genes is ignored.
pub fn parse_genome(s: &str) -> Result<Vec<f64>, FilterError> {
    s.split(',')
        .map(str::trim)
        .map(|gene| {
            gene.parse::<f64>()
                .map_err(|e| FilterError::Parse(format!("invalid gene '{gene}': {e}")))
        })
        .collect()
}

/// Parse one genome per non-empty line; `#` starts a comment.
pub fn parse_genome_lines(text: &str) -> Result<Vec<Vec<f64>>, FilterError> {
    let mut genomes = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        let content = line.split('#').next().unwrap_or_default().trim();
        if content.is_empty() {
            continue;
        }
        let genome = parse_genome(content)
            .map_err(|e| FilterError::Parse(format!("line {}: {e}", idx + 1)))?;
        genomes.push(genome);
    }
    Ok(genomes)
}

pub fn read_genome_file(path: &Path) -> Result<Vec<Vec<f64>>, AppError> {
    let text = fs::read_to_string(path)
        .map_err(|e| AppError::new(2, format!("Failed to read genome file '{}': {e}", path.display())))?;
    Ok(parse_genome_lines(&text)?)
}

/// Inverse of [`parse_genome`], full precision.
pub fn format_genome(genome: &[f64]) -> String {
    let parts: Vec<String> = genome.iter().map(f64::to_string).collect();
    parts.join(",")
}
