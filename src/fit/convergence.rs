//! Early-termination policy, fed once per generation with the best fitness.
//!
//! The policy is advisory: the search engine may stop on its own rules first.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Improvements smaller than `previous / STAGNATION_DIVISOR` count as a stall.
/// The comparison is signed: with negative fitness a flat history is not a stall.
pub const STAGNATION_DIVISOR: f64 = 500.0;
/// Consecutive stalled generations before giving up.
pub const DEFAULT_STAGNATION_WINDOW: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Termination {
    /// All masks are met and no further refinement was requested.
    Feasible,
    /// The evaluation budget is spent.
    Budget,
    /// The best fitness stopped improving.
    Stagnant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "state", content = "reason")]
pub enum ConvergenceState {
    Running,
    Stopped(Termination),
}

impl ConvergenceState {
    pub fn is_stopped(self) -> bool {
        matches!(self, ConvergenceState::Stopped(_))
    }
}

#[derive(Debug, Clone)]
pub struct ConvergencePolicy {
    optimize_further: bool,
    max_evaluations: Option<u64>,
    /// `0` disables the stagnation rule.
    stagnation_window: usize,
    previous: Option<f64>,
    stalled: usize,
    generations: usize,
    state: ConvergenceState,
}

impl ConvergencePolicy {
    pub fn new(optimize_further: bool, max_evaluations: Option<u64>, stagnation_window: usize) -> Self {
        Self {
            optimize_further,
            max_evaluations,
            stagnation_window,
            previous: None,
            stalled: 0,
            generations: 0,
            state: ConvergenceState::Running,
        }
    }

    pub fn state(&self) -> ConvergenceState {
        self.state
    }

    /// Generations observed so far.
    pub fn generations(&self) -> usize {
        self.generations
    }

    /// Consecutive stalled generations so far.
    pub fn stalled(&self) -> usize {
        self.stalled
    }

    /// Feed the best fitness of a generation and the total evaluation count.
    pub fn observe(&mut self, best: f64, evaluations: u64) -> ConvergenceState {
        if self.state.is_stopped() {
            return self.state;
        }
        self.generations += 1;

        if let Some(previous) = self.previous {
            if previous - best < previous / STAGNATION_DIVISOR {
                self.stalled += 1;
            } else {
                self.stalled = 0;
            }
        }
        self.previous = Some(best);

        let reason = if best == 0.0 && !self.optimize_further {
            Some(Termination::Feasible)
        } else if self.max_evaluations.is_some_and(|max| evaluations >= max) {
            Some(Termination::Budget)
        } else if self.stagnation_window > 0 && self.stalled >= self.stagnation_window {
            Some(Termination::Stagnant)
        } else {
            None
        };

        if let Some(reason) = reason {
            debug!(
                ?reason,
                generation = self.generations,
                best,
                evaluations,
                "convergence policy stopped the search"
            );
            self.state = ConvergenceState::Stopped(reason);
        }
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_fitness_stops_unless_refining() {
        let mut policy = ConvergencePolicy::new(false, None, DEFAULT_STAGNATION_WINDOW);
        assert_eq!(policy.observe(3.0, 150), ConvergenceState::Running);
        assert_eq!(policy.observe(0.0, 300), ConvergenceState::Stopped(Termination::Feasible));

        let mut refining = ConvergencePolicy::new(true, None, DEFAULT_STAGNATION_WINDOW);
        assert_eq!(refining.observe(0.0, 150), ConvergenceState::Running);
    }

    #[test]
    fn budget_is_inclusive() {
        let mut policy = ConvergencePolicy::new(false, Some(300), DEFAULT_STAGNATION_WINDOW);
        assert_eq!(policy.observe(10.0, 150), ConvergenceState::Running);
        assert_eq!(policy.observe(5.0, 300), ConvergenceState::Stopped(Termination::Budget));
    }

    #[test]
    fn stagnation_needs_a_full_window() {
        let mut policy = ConvergencePolicy::new(false, None, 3);
        // first observation only sets the baseline
        assert_eq!(policy.observe(100.0, 1), ConvergenceState::Running);
        // 0.1 < 100/500: stalled
        assert_eq!(policy.observe(99.9, 2), ConvergenceState::Running);
        assert_eq!(policy.observe(99.9, 3), ConvergenceState::Running);
        assert_eq!(policy.stalled(), 2);
        // a real improvement resets the counter
        assert_eq!(policy.observe(50.0, 4), ConvergenceState::Running);
        assert_eq!(policy.stalled(), 0);
        for n in 5..7 {
            assert_eq!(policy.observe(50.0, n), ConvergenceState::Running);
        }
        assert_eq!(policy.observe(50.0, 7), ConvergenceState::Stopped(Termination::Stagnant));
        assert_eq!(policy.generations(), 7);
    }

    #[test]
    fn flat_negative_history_is_not_a_stall() {
        let mut policy = ConvergencePolicy::new(true, None, 3);
        for n in 0..6 {
            assert_eq!(policy.observe(-10.0, n), ConvergenceState::Running);
        }
        assert_eq!(policy.stalled(), 0);

        // a worse value is still a stall
        assert_eq!(policy.observe(-9.0, 6), ConvergenceState::Running);
        assert_eq!(policy.stalled(), 1);
    }

    #[test]
    fn stopped_is_sticky() {
        let mut policy = ConvergencePolicy::new(false, None, DEFAULT_STAGNATION_WINDOW);
        policy.observe(0.0, 1);
        assert_eq!(policy.observe(5.0, 2), ConvergenceState::Stopped(Termination::Feasible));
        assert_eq!(policy.generations(), 1);
    }

    #[test]
    fn zero_window_disables_stagnation() {
        let mut policy = ConvergencePolicy::new(false, None, 0);
        for n in 0..1000 {
            assert_eq!(policy.observe(1.0, n), ConvergenceState::Running);
        }
    }
}
