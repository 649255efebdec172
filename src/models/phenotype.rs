//! Genome decoding: polar pole/zero genes → zeros, poles, transfer function.
//!
//! Gene layout for `z` zeros and `p` poles (length `2·(z+p)`):
//!
//! ```text
//! [r_z0, θ_z0, r_z1, θ_z1, ..., r_p0, θ_p0, ...]
//! ```
//!
//! Each pair maps to `r · e^(2πi·θ)`. Angles live in `[0, 0.5]` (upper half
//! plane); every root off the real axis gets its conjugate appended so the
//! filter has real coefficients.

use std::f64::consts::PI;

use num_complex::Complex64;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::FilterError;
use crate::math::{freq_response, TransferFunction};

/// Upper radius of the zero genes.
pub const ZERO_RADIUS_MAX: f64 = 5.0;
/// Upper radius of the pole genes; keeps every pole inside the unit circle.
pub const POLE_RADIUS_MAX: f64 = 0.999;
/// Angle genes are fractions of a full turn; half a turn covers the upper half plane.
pub const ANGLE_MAX: f64 = 0.5;

/// How the numerator gain is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode", content = "value")]
pub enum Gain {
    Fixed(f64),
    /// Normalize to 0 dB at DC.
    Auto,
}

impl Gain {
    /// `0` means "auto", as on the command line.
    pub fn from_value(value: f64) -> Self {
        if value == 0.0 { Gain::Auto } else { Gain::Fixed(value) }
    }
}

/// Number of zeros and poles encoded in a genome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenomeLayout {
    pub zeros: usize,
    pub poles: usize,
}

impl GenomeLayout {
    pub fn new(zeros: usize, poles: usize) -> Self {
        Self { zeros, poles }
    }

    pub fn gene_count(&self) -> usize {
        2 * (self.zeros + self.poles)
    }

    /// Offset of the first pole gene.
    fn pole_offset(&self) -> usize {
        2 * self.zeros
    }

    /// Allowed `(min, max)` of every gene, in genome order.
    pub fn init_ranges(&self) -> Vec<(f64, f64)> {
        let mut ranges = Vec::with_capacity(self.gene_count());
        for _ in 0..self.zeros {
            ranges.push((0.0, ZERO_RADIUS_MAX));
            ranges.push((0.0, ANGLE_MAX));
        }
        for _ in 0..self.poles {
            ranges.push((0.0, POLE_RADIUS_MAX));
            ranges.push((0.0, ANGLE_MAX));
        }
        ranges
    }

    /// A genome drawn uniformly from `init_ranges`.
    pub fn random_genome<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<f64> {
        self.init_ranges()
            .into_iter()
            .map(|(lo, hi)| rng.gen_range(lo..=hi))
            .collect()
    }

    pub fn check(&self, genome: &[f64]) -> Result<(), FilterError> {
        if genome.len() != self.gene_count() {
            return Err(FilterError::Genome(format!(
                "expected {} genes for {} zeros and {} poles, got {}",
                self.gene_count(),
                self.zeros,
                self.poles,
                genome.len()
            )));
        }
        Ok(())
    }

    /// Reorder zero pairs and pole pairs (independently) by angle, then radius.
    ///
    /// Genomes that encode the same filter with permuted roots become equal,
    /// which helps crossover in engines that support a pre-evaluation hook.
    pub fn sort_pairs(&self, genome: &mut [f64]) -> Result<(), FilterError> {
        self.check(genome)?;
        let (zeros, poles) = genome.split_at_mut(self.pole_offset());
        sort_pair_block(zeros);
        sort_pair_block(poles);
        Ok(())
    }
}

fn sort_pair_block(block: &mut [f64]) {
    let mut pairs: Vec<(f64, f64)> = block.chunks_exact(2).map(|p| (p[1], p[0])).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    for (slot, (angle, radius)) in block.chunks_exact_mut(2).zip(pairs) {
        slot[0] = radius;
        slot[1] = angle;
    }
}

/// Append the conjugate of every entry with a non-zero imaginary part.
pub fn complete_conjugates(roots: &mut Vec<Complex64>) {
    let conjugates: Vec<Complex64> = roots.iter().filter(|r| r.im != 0.0).map(|r| r.conj()).collect();
    roots.extend(conjugates);
}

/// A decoded candidate filter.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterModel {
    zeros: Vec<Complex64>,
    poles: Vec<Complex64>,
    gain: f64,
    tf: TransferFunction,
}

impl FilterModel {
    pub fn from_genome(layout: &GenomeLayout, genome: &[f64], gain: Gain) -> Result<Self, FilterError> {
        layout.check(genome)?;
        let (zero_genes, pole_genes) = genome.split_at(layout.pole_offset());

        let mut zeros = decode_roots(zero_genes);
        let mut poles = decode_roots(pole_genes);
        complete_conjugates(&mut zeros);
        complete_conjugates(&mut poles);

        Ok(Self::from_roots(zeros, poles, gain))
    }

    /// Build from explicit root lists (already closed under conjugation).
    pub fn from_roots(zeros: Vec<Complex64>, poles: Vec<Complex64>, gain: Gain) -> Self {
        let gain = match gain {
            Gain::Fixed(k) => k,
            Gain::Auto => dc_normalizing_gain(&zeros, &poles),
        };
        let tf = TransferFunction::from_zpk(&zeros, &poles, gain);
        Self {
            zeros,
            poles,
            gain,
            tf,
        }
    }

    pub fn zeros(&self) -> &[Complex64] {
        &self.zeros
    }

    pub fn poles(&self) -> &[Complex64] {
        &self.poles
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn transfer_function(&self) -> &TransferFunction {
        &self.tf
    }

    /// True when every pole lies strictly inside the unit circle.
    pub fn is_stable(&self) -> bool {
        self.poles.iter().all(|p| p.norm() < 1.0)
    }
}

fn decode_roots(genes: &[f64]) -> Vec<Complex64> {
    genes
        .chunks_exact(2)
        .map(|pair| Complex64::from_polar(pair[0], 2.0 * PI * pair[1]))
        .collect()
}

/// Gain that makes `|H(1)| = 1`; unity when the DC response is degenerate.
fn dc_normalizing_gain(zeros: &[Complex64], poles: &[Complex64]) -> f64 {
    let unit = TransferFunction::from_zpk(zeros, poles, 1.0);
    let dc = freq_response(&unit, &[0.0])[0].norm();
    if dc.is_finite() && dc > f64::EPSILON { 1.0 / dc } else { 1.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn genome_length_is_checked() {
        let layout = GenomeLayout::new(2, 1);
        assert_eq!(layout.gene_count(), 6);
        let err = FilterModel::from_genome(&layout, &[0.5; 5], Gain::Fixed(1.0));
        assert!(matches!(err, Err(FilterError::Genome(_))));
    }

    #[test]
    fn conjugates_are_appended_for_complex_roots_only() {
        let layout = GenomeLayout::new(2, 1);
        // zero on the real axis (angle 0), complex zero, complex pole
        let genome = [0.5, 0.0, 1.2, 0.1, 0.8, 0.25];
        let model = FilterModel::from_genome(&layout, &genome, Gain::Fixed(1.0)).unwrap();
        assert_eq!(model.zeros().len(), 3);
        assert_eq!(model.poles().len(), 2);
        for root in model.zeros().iter().chain(model.poles()) {
            let closed = model
                .zeros()
                .iter()
                .chain(model.poles())
                .any(|other| (other - root.conj()).norm() < 1e-15);
            assert!(closed);
        }
        let tf = model.transfer_function();
        assert_eq!(tf.b.len(), 4);
        assert_eq!(tf.a.len(), 3);
        assert!(model.is_stable());
    }

    #[test]
    fn real_coefficients_after_completion() {
        let layout = GenomeLayout::new(3, 2);
        let mut rng = StdRng::seed_from_u64(7);
        let genome = layout.random_genome(&mut rng);
        let model = FilterModel::from_genome(&layout, &genome, Gain::Fixed(0.5)).unwrap();
        let zc = crate::math::poly_from_roots(model.zeros());
        let pc = crate::math::poly_from_roots(model.poles());
        assert!(zc.iter().chain(&pc).all(|c| c.im.abs() < 1e-9));
    }

    #[test]
    fn random_genome_respects_ranges() {
        let layout = GenomeLayout::new(5, 4);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..20 {
            let genome = layout.random_genome(&mut rng);
            for (g, (lo, hi)) in genome.iter().zip(layout.init_ranges()) {
                assert!(*g >= lo && *g <= hi);
            }
        }
    }

    #[test]
    fn sort_pairs_orders_by_angle_within_each_block() {
        let layout = GenomeLayout::new(2, 2);
        let mut genome = vec![1.0, 0.4, 2.0, 0.1, 0.9, 0.3, 0.5, 0.2];
        layout.sort_pairs(&mut genome).unwrap();
        assert_eq!(genome, vec![2.0, 0.1, 1.0, 0.4, 0.5, 0.2, 0.9, 0.3]);
    }

    #[test]
    fn auto_gain_normalizes_dc() {
        let model = FilterModel::from_roots(vec![], vec![Complex64::new(0.5, 0.0)], Gain::Auto);
        assert!((model.gain() - 0.5).abs() < 1e-12);
        let h = freq_response(model.transfer_function(), &[0.0]);
        assert!((h[0].norm() - 1.0).abs() < 1e-12);

        let degenerate = FilterModel::from_roots(vec![Complex64::new(1.0, 0.0)], vec![], Gain::Auto);
        assert_eq!(degenerate.gain(), 1.0);
        assert_eq!(Gain::from_value(0.0), Gain::Auto);
    }
}
