//! Read/write report JSON files.
//!
//! The schema is defined by `domain::EvaluationReport`.

use std::fs::File;
use std::path::Path;

use crate::domain::EvaluationReport;
use crate::error::AppError;

pub fn write_report_json(path: &Path, report: &EvaluationReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create report JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, report)
        .map_err(|e| AppError::new(2, format!("Failed to write report JSON: {e}")))?;
    Ok(())
}

pub fn read_report_json(path: &Path) -> Result<EvaluationReport, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open report JSON '{}': {e}", path.display())))?;
    let report: EvaluationReport =
        serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid report JSON: {e}")))?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::bounds::Masks;
    use crate::domain::{DesignSummary, GenomeReport, MaskSummary, TOOL_NAME};
    use crate::fit::{EvaluatorOptions, FitnessEvaluator};
    use crate::models::{FilterModel, Gain, GenomeLayout};

    #[test]
    fn report_json_round_trip() {
        let masks = Masks::builtin(true).unwrap();
        let evaluator = FitnessEvaluator::new(masks.clone(), EvaluatorOptions::default());
        let layout = GenomeLayout::new(1, 1);
        let genome = vec![0.5, 0.25, 0.5, 0.1];
        let model = FilterModel::from_genome(&layout, &genome, Gain::Auto).unwrap();
        let evaluation = evaluator.evaluate_detailed(&model).unwrap();

        let report = EvaluationReport {
            tool: TOOL_NAME.to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 10, 15, 12, 0, 0).unwrap(),
            design: DesignSummary {
                zeros: 1,
                poles: 1,
                gain: Gain::Auto,
                scale_by_pi: true,
                evaluator: EvaluatorOptions::default(),
                sort_population: false,
                masks: MaskSummary::from(&masks),
            },
            genomes: vec![GenomeReport::new(genome, &model, evaluation)],
            best: Some(0),
        };

        let path = std::env::temp_dir().join(format!("fopt-report-{}.json", std::process::id()));
        write_report_json(&path, &report).unwrap();
        let back = read_report_json(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(back.tool, report.tool);
        assert_eq!(back.generated_at, report.generated_at);
        assert_eq!(back.design.masks, report.design.masks);
        assert_eq!(back.design.gain, Gain::Auto);
        let scale = back.design.evaluator.delay_bound_scale;
        assert!((scale - report.design.evaluator.delay_bound_scale).abs() < 1e-15);
        assert_eq!(back.best_genome().unwrap().genome, vec![0.5, 0.25, 0.5, 0.1]);
        let (a, b) = (&back.genomes[0].evaluation, &report.genomes[0].evaluation);
        assert!((a.fitness - b.fitness).abs() <= 1e-12 * b.fitness.abs().max(1.0));
        assert_eq!(a.violations.len(), b.violations.len());
    }

    #[test]
    fn missing_report_is_an_io_error() {
        let err = read_report_json(Path::new("/nonexistent/fopt/report.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
