//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the scoring code stays clean and testable
//! - output changes are localized

use crate::bounds::{BoundSet, Masks};
use crate::domain::{DesignSummary, EvaluationReport, GenomeReport, ReplayOutcome, Root};
use crate::io::format_genome;
use crate::models::Gain;

/// Header block: layout, gain, options and masks.
pub fn format_design_summary(design: &DesignSummary) -> String {
    let mut out = String::new();
    out.push_str("=== fopt - pole/zero filter design ===\n");
    out.push_str(&format!("Layout: {} zeros, {} poles\n", design.zeros, design.poles));
    let gain = match design.gain {
        Gain::Fixed(k) => format!("{k}"),
        Gain::Auto => "auto (0 dB at DC)".to_string(),
    };
    out.push_str(&format!("Gain: {gain}\n"));
    out.push_str(&format!(
        "Options: scale_by_pi={} optimize_further={} prefilter={} sort_population={}\n",
        design.scale_by_pi,
        design.evaluator.optimize_further,
        design.evaluator.use_prefilter,
        design.sort_population
    ));
    out.push_str("Masks:\n");
    out.push_str(&format!("  magnitude upper: {}\n", design.masks.magnitude_upper));
    out.push_str(&format!("  magnitude lower: {}\n", design.masks.magnitude_lower));
    out.push_str(&format!("  delay upper    : {}\n", design.masks.delay_upper));
    out.push_str(&format!("  delay lower    : {}\n", design.masks.delay_lower));
    out
}

/// One line per genome; the best one is starred.
pub fn format_evaluations(genomes: &[GenomeReport], best: Option<usize>) -> String {
    let mut out = String::new();
    out.push_str(
        format!(
            "  {:>4} {:>14} {:>14} {:>10} {:>12} {:<6}",
            "#", "fitness", "violation", "points", "delay_off", "stable"
        )
        .trim_end(),
    );
    out.push('\n');
    out.push_str(format!("  {:-<4} {:-<14} {:-<14} {:-<10} {:-<12} {:-<6}", "", "", "", "", "", "").trim_end());
    out.push('\n');

    for (idx, g) in genomes.iter().enumerate() {
        let mark = if Some(idx) == best { "*" } else { " " };
        let offset = g
            .evaluation
            .delay_offset
            .map(|d| format!("{d:.4}"))
            .unwrap_or_else(|| "-".to_string());
        out.push_str(
            format!(
                "{mark} {:>4} {:>14.6e} {:>14.6e} {:>10} {:>12} {:<6}",
                idx,
                g.evaluation.fitness,
                g.evaluation.violation,
                g.evaluation.violations.len(),
                offset,
                if g.stable { "yes" } else { "no" },
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out
}

/// Decoded filter of one genome, optionally with every violated point.
pub fn format_genome_detail(g: &GenomeReport, show_violations: bool) -> String {
    let mut out = String::new();
    out.push_str(&format!("- genome: {}\n", format_genome(&g.genome)));
    out.push_str(&format!("- zeros : {}\n", fmt_roots(&g.zeros)));
    out.push_str(&format!("- poles : {}\n", fmt_roots(&g.poles)));
    out.push_str(&format!("- gain  : {:.8}\n", g.gain));
    out.push_str(&format!("- b     : {}\n", fmt_vec(&g.b)));
    out.push_str(&format!("- a     : {}\n", fmt_vec(&g.a)));
    if g.evaluation.is_feasible() {
        out.push_str("- all masks met");
        if g.evaluation.refinement > 0.0 {
            out.push_str(&format!(" (refinement {:.6})", g.evaluation.refinement));
        }
        out.push('\n');
    } else {
        out.push_str(&format!(
            "- {} violated points, sum of squares {:.6e}\n",
            g.evaluation.violations.len(),
            g.evaluation.violation
        ));
    }

    if show_violations && !g.evaluation.violations.is_empty() {
        out.push_str(format!("  {:<16} {:>10} {:>12} {:>12} {:>12}", "mask", "x", "bound", "value", "penalty").trim_end());
        out.push('\n');
        for v in &g.evaluation.violations {
            out.push_str(&format!(
                "  {:<16} {:>10.5} {:>12.5} {:>12.5} {:>12.4e}\n",
                format!("{:?}", v.side),
                v.x,
                v.bound,
                v.value,
                v.penalty
            ));
        }
    }
    out
}

/// Summary, table and best-genome detail of a whole report.
pub fn format_report(report: &EvaluationReport, show_violations: bool) -> String {
    let mut out = format_design_summary(&report.design);
    out.push_str(&format!("Generated: {} by {}\n\n", report.generated_at.to_rfc3339(), report.tool));
    out.push_str(&format_evaluations(&report.genomes, report.best));
    if let Some(best) = report.best_genome() {
        out.push_str("\nBest genome:\n");
        out.push_str(&format_genome_detail(best, show_violations));
    }
    out
}

/// Resolved `(x, y)` points of every active mask.
pub fn format_masks(masks: &Masks) -> String {
    let mut out = String::new();
    for (name, set) in mask_sides(masks) {
        if !set.is_active() {
            out.push_str(&format!("{name}: (none)\n"));
            continue;
        }
        out.push_str(&format!("{name}: {set} ({} points)\n", set.len()));
        for (x, y) in set {
            out.push_str(&format!("  {x:>12.6} {y:>12.6}\n"));
        }
    }
    out
}

/// Mask values at the requested abscissas (declared units).
pub fn format_interpolation(masks: &Masks, at: &[f64]) -> String {
    let mut out = String::new();
    let sides = mask_sides(masks);
    out.push_str(&format!("{:>12}", "x"));
    for (name, _) in &sides {
        out.push_str(&format!(" {name:>16}"));
    }
    out.push('\n');
    for &x in at {
        out.push_str(&format!("{x:>12.6}"));
        for (_, set) in &sides {
            let cell = if !set.is_active() {
                "-".to_string()
            } else {
                match set.interpolate(x) {
                    Ok(y) => format!("{y:.6}"),
                    Err(_) => "out of range".to_string(),
                }
            };
            out.push_str(&format!(" {cell:>16}"));
        }
        out.push('\n');
    }
    out
}

/// Delay masks as the best genome was checked against them: scaled and
/// moved up by the alignment offset, in samples.
pub fn format_aligned_delay(masks: &Masks, delay_offset: f64, scale: f64) -> String {
    let mut out = String::new();
    out.push_str(&format!("Delay masks aligned at offset {delay_offset:.4} samples:\n"));
    for (name, set) in [("upper", &masks.delay_upper), ("lower", &masks.delay_lower)] {
        if set.is_active() {
            let shifted = set.shifted_y(delay_offset, scale);
            out.push_str(&format!("  {name}: {}\n", fmt_vec(&shifted)));
        }
    }
    out
}

pub fn format_replay(outcome: &ReplayOutcome, rows: usize) -> String {
    match outcome.stopped {
        Some((generation, row, reason)) => format!(
            "Stopped at generation {generation} of {rows} ({reason:?}): evaluations={} best={:.6e}\n",
            row.evaluations, row.best
        ),
        None => format!("Still running after {} generations.\n", outcome.generations),
    }
}

fn mask_sides(masks: &Masks) -> [(&'static str, &BoundSet); 4] {
    [
        ("magnitude upper", &masks.magnitude_upper),
        ("magnitude lower", &masks.magnitude_lower),
        ("delay upper", &masks.delay_upper),
        ("delay lower", &masks.delay_lower),
    ]
}

fn fmt_vec(v: &[f64]) -> String {
    let parts: Vec<String> = v.iter().map(|x| format!("{x:.6}")).collect();
    format!("[{}]", parts.join(", "))
}

fn fmt_roots(roots: &[Root]) -> String {
    let parts: Vec<String> = roots
        .iter()
        .map(|[re, im]| if *im < 0.0 { format!("{re:.4}-{:.4}j", -im) } else { format!("{re:.4}+{im:.4}j") })
        .collect();
    format!("[{}]", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bounds::BoundKind;
    use crate::domain::HistoryRow;
    use crate::fit::{Evaluation, Termination};

    fn genome_report(fitness: f64) -> GenomeReport {
        GenomeReport {
            genome: vec![0.5, 0.25],
            evaluation: Evaluation {
                fitness,
                violation: fitness.max(0.0),
                refinement: 0.0,
                delay_offset: None,
                violations: Vec::new(),
            },
            zeros: vec![[0.0, 0.5], [0.0, -0.5]],
            poles: Vec::new(),
            gain: 1.0,
            b: vec![1.0, 0.0, 0.25],
            a: vec![1.0],
            stable: true,
        }
    }

    #[test]
    fn best_row_is_marked() {
        let table = format_evaluations(&[genome_report(2.0), genome_report(0.0)], Some(1));
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("  "));
        assert!(lines[3].starts_with("* "));
    }

    #[test]
    fn roots_print_with_sign() {
        let detail = format_genome_detail(&genome_report(0.0), true);
        // the genome line can be pasted back into --genome
        assert!(detail.contains("- genome: 0.5,0.25\n"));
        assert!(detail.contains("0.0000+0.5000j"));
        assert!(detail.contains("0.0000-0.5000j"));
        assert!(detail.contains("all masks met"));
    }

    #[test]
    fn interpolation_marks_inactive_and_out_of_range() {
        let masks = Masks::new(
            BoundSet::parse("0,0.5,0,-10,3", BoundKind::Upper, false).unwrap(),
            BoundSet::empty(BoundKind::Lower),
            BoundSet::empty(BoundKind::Upper),
            BoundSet::empty(BoundKind::Lower),
        )
        .unwrap();
        let text = format_interpolation(&masks, &[0.25, 0.75]);
        let lines: Vec<&str> = text.lines().collect();
        assert!(lines[1].contains("-5.000000"));
        assert!(lines[2].contains("out of range"));
        assert!(lines[1].trim_end().ends_with('-'));
    }

    #[test]
    fn replay_reports_reason() {
        let outcome = ReplayOutcome {
            generations: 3,
            stopped: Some((3, HistoryRow { evaluations: 450, best: 0.0 }, Termination::Feasible)),
        };
        assert!(format_replay(&outcome, 5).starts_with("Stopped at generation 3 of 5 (Feasible)"));
        let running = ReplayOutcome { generations: 5, stopped: None };
        assert!(format_replay(&running, 5).contains("after 5 generations"));
    }
}
