//! Newton-Raphson root finding with a bisection fallback.
//!
//! The solver runs in two phases. The Newton phase iterates
//! $T_{k+1} = T_k - F(T_k) / F'(T_k)$ until successive estimates differ by less
//! than the tolerance. If it has not converged within the iteration limit it
//! stalls; when the last two residuals bracket a root, the bisection phase
//! takes over from that bracket. Without a bracket the latest Newton estimate
//! is returned and flagged as [`SolutionMethod::NonConvergent`].

use log::debug;
use serde::{Deserialize, Serialize};

use crate::errors::SolverError;
use crate::FloatValue;

/// A scalar energy balance residual and its analytic derivative.
///
/// Implementations must be pure: evaluating the same temperature twice gives
/// the same value.
pub trait ResidualFunction {
    /// Net energy flux into the node (W/m^2) at `temperature` (K).
    fn residual(&self, temperature: FloatValue) -> FloatValue;

    /// Derivative of [`ResidualFunction::residual`] with respect to temperature.
    fn derivative(&self, temperature: FloatValue) -> FloatValue;
}

/// Iteration limits and tolerance for [`solve`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverSettings {
    /// Convergence threshold on the temperature step (K).
    /// Default: 1e-4
    pub tolerance: FloatValue,

    /// Newton steps before falling back to bisection.
    /// Default: 100
    pub max_newton_iterations: usize,

    /// Bisection steps before giving up.
    /// Default: 200
    pub max_bisection_iterations: usize,

    /// Maximum number of Newton iterates recorded.
    /// Default: 500
    pub history_capacity: usize,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            tolerance: 1e-4,
            max_newton_iterations: 100,
            max_bisection_iterations: 200,
            history_capacity: 500,
        }
    }
}

/// How the returned temperature was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolutionMethod {
    Newton,
    Bisection,
    /// Newton stalled without a sign change; the latest estimate is returned.
    NonConvergent,
}

/// Result of a root search.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub temperature: FloatValue,
    pub method: SolutionMethod,
    pub newton_iterations: usize,
    pub bisection_iterations: usize,
    /// Magnitude of the final temperature update (K).
    pub final_step: FloatValue,
}

impl Solution {
    pub fn is_converged(&self) -> bool {
        self.method != SolutionMethod::NonConvergent
    }
}

/// Record of Newton iterates and their residuals.
#[derive(Debug, Clone)]
pub struct IterationHistory {
    temperatures: Vec<FloatValue>,
    residuals: Vec<FloatValue>,
    capacity: usize,
}

impl IterationHistory {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            temperatures: Vec::with_capacity(capacity.min(128)),
            residuals: Vec::with_capacity(capacity.min(128)),
            capacity,
        }
    }

    /// Append an iterate, failing once the capacity is reached.
    pub fn push(
        &mut self,
        temperature: FloatValue,
        residual: FloatValue,
    ) -> Result<(), SolverError> {
        if self.temperatures.len() >= self.capacity {
            return Err(SolverError::HistoryExhausted {
                capacity: self.capacity,
            });
        }
        self.temperatures.push(temperature);
        self.residuals.push(residual);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    pub fn temperatures(&self) -> &[FloatValue] {
        &self.temperatures
    }

    pub fn residuals(&self) -> &[FloatValue] {
        &self.residuals
    }

    /// The last two iterates if their residuals have opposite signs.
    ///
    /// Returned as `(latest, previous)` pairs of `(temperature, residual)`.
    pub fn sign_change(&self) -> Option<Bracket> {
        let n = self.len();
        if n < 2 {
            return None;
        }
        let latest = (self.temperatures[n - 1], self.residuals[n - 1]);
        let previous = (self.temperatures[n - 2], self.residuals[n - 2]);
        if opposite_signs(latest.1, previous.1) {
            Some(Bracket { latest, previous })
        } else {
            None
        }
    }
}

/// Two iterates whose residuals straddle zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub latest: (FloatValue, FloatValue),
    pub previous: (FloatValue, FloatValue),
}

/// Outcome of the Newton phase.
#[derive(Debug, Clone, PartialEq)]
enum NewtonPhase {
    Converged {
        temperature: FloatValue,
        step: FloatValue,
    },
    Stalled {
        estimate: FloatValue,
        step: FloatValue,
        bracket: Option<Bracket>,
    },
}

fn opposite_signs(a: FloatValue, b: FloatValue) -> bool {
    (a < 0.0 && b > 0.0) || (a > 0.0 && b < 0.0)
}

fn newton_phase<F: ResidualFunction + ?Sized>(
    function: &F,
    initial: FloatValue,
    settings: &SolverSettings,
    history: &mut IterationHistory,
) -> Result<NewtonPhase, SolverError> {
    let mut current = initial;
    let mut step = FloatValue::INFINITY;

    for _ in 0..settings.max_newton_iterations {
        let residual = function.residual(current);
        if !residual.is_finite() {
            return Err(SolverError::NonFiniteResidual {
                temperature: current,
            });
        }
        history.push(current, residual)?;

        if residual == 0.0 {
            return Ok(NewtonPhase::Converged {
                temperature: current,
                step: 0.0,
            });
        }

        let derivative = function.derivative(current);
        let next = current - residual / derivative;
        if !next.is_finite() {
            debug!(
                "Newton step undefined at T={} K (F'={}), stopping Newton phase",
                current, derivative
            );
            return Ok(NewtonPhase::Stalled {
                estimate: current,
                step,
                bracket: history.sign_change(),
            });
        }

        step = (next - current).abs();
        if step <= settings.tolerance {
            return Ok(NewtonPhase::Converged {
                temperature: next,
                step,
            });
        }
        current = next;
    }

    Ok(NewtonPhase::Stalled {
        estimate: current,
        step,
        bracket: history.sign_change(),
    })
}

/// Bisect inside `bracket`, returning the root estimate, iteration count and final step.
fn bisection_phase<F: ResidualFunction + ?Sized>(
    function: &F,
    bracket: Bracket,
    settings: &SolverSettings,
) -> Result<(FloatValue, usize, FloatValue), SolverError> {
    let (mut kept, mut kept_residual) = bracket.latest;
    let (mut other, mut other_residual) = bracket.previous;
    let mut midpoint = 0.5 * (kept + other);

    for iteration in 1..=settings.max_bisection_iterations {
        let residual = function.residual(midpoint);
        if !residual.is_finite() {
            return Err(SolverError::NonFiniteResidual {
                temperature: midpoint,
            });
        }
        if residual == 0.0 {
            return Ok((midpoint, iteration, 0.0));
        }

        if opposite_signs(residual, kept_residual) {
            other = midpoint;
            other_residual = residual;
        } else if opposite_signs(residual, other_residual) {
            kept = midpoint;
            kept_residual = residual;
        }

        let next = 0.5 * (kept + other);
        let step = (next - midpoint).abs();
        if step <= settings.tolerance {
            return Ok((next, iteration, step));
        }
        midpoint = next;
    }

    Err(SolverError::BisectionFailed {
        iterations: settings.max_bisection_iterations,
        estimate: midpoint,
    })
}

/// Find the temperature at which `function` balances, starting from `initial`.
pub fn solve<F: ResidualFunction + ?Sized>(
    function: &F,
    initial: FloatValue,
    settings: &SolverSettings,
) -> Result<Solution, SolverError> {
    let mut history = IterationHistory::with_capacity(settings.history_capacity);

    match newton_phase(function, initial, settings, &mut history)? {
        NewtonPhase::Converged { temperature, step } => Ok(Solution {
            temperature,
            method: SolutionMethod::Newton,
            newton_iterations: history.len(),
            bisection_iterations: 0,
            final_step: step,
        }),
        NewtonPhase::Stalled {
            estimate,
            bracket: Some(bracket),
            ..
        } => {
            debug!(
                "Newton stalled near T={} K after {} iterations, bisecting",
                estimate,
                history.len()
            );
            let (temperature, iterations, final_step) =
                bisection_phase(function, bracket, settings)?;
            Ok(Solution {
                temperature,
                method: SolutionMethod::Bisection,
                newton_iterations: history.len(),
                bisection_iterations: iterations,
                final_step,
            })
        }
        NewtonPhase::Stalled {
            estimate,
            step,
            bracket: None,
        } => Ok(Solution {
            temperature: estimate,
            method: SolutionMethod::NonConvergent,
            newton_iterations: history.len(),
            bisection_iterations: 0,
            final_step: step,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Linearised radiative balance: F(T) = a - b (T - 300).
    struct Linear {
        a: FloatValue,
        b: FloatValue,
    }

    impl ResidualFunction for Linear {
        fn residual(&self, t: FloatValue) -> FloatValue {
            self.a - self.b * (t - 300.0)
        }
        fn derivative(&self, _t: FloatValue) -> FloatValue {
            -self.b
        }
    }

    /// Monotonic, single root: absorbed flux minus emitted longwave.
    struct Radiative;

    impl ResidualFunction for Radiative {
        fn residual(&self, t: FloatValue) -> FloatValue {
            400.0 - 5.67e-8 * t.powi(4)
        }
        fn derivative(&self, t: FloatValue) -> FloatValue {
            -4.0 * 5.67e-8 * t.powi(3)
        }
    }

    /// Square-root residual: every Newton step lands on the mirror image of
    /// the previous iterate, so Newton cycles across the root forever.
    struct Cycling;

    impl ResidualFunction for Cycling {
        fn residual(&self, t: FloatValue) -> FloatValue {
            let x = t - 290.0;
            -x.signum() * x.abs().sqrt()
        }
        fn derivative(&self, t: FloatValue) -> FloatValue {
            let x = t - 290.0;
            -0.5 / x.abs().sqrt()
        }
    }

    /// Residual with no root and a derivative pointing nowhere useful.
    struct NoRoot;

    impl ResidualFunction for NoRoot {
        fn residual(&self, t: FloatValue) -> FloatValue {
            10.0 + (t - 280.0).powi(2)
        }
        fn derivative(&self, t: FloatValue) -> FloatValue {
            2.0 * (t - 280.0)
        }
    }

    #[test]
    fn test_linear_converges_by_newton() {
        let f = Linear { a: 50.0, b: 10.0 };
        let solution = solve(&f, 280.0, &SolverSettings::default()).unwrap();

        assert_eq!(solution.method, SolutionMethod::Newton);
        assert!((solution.temperature - 305.0).abs() < 1e-9);
        assert!(solution.newton_iterations <= 3);
    }

    #[test]
    fn test_monotonic_root_needs_no_bisection() {
        let solution = solve(&Radiative, 300.0, &SolverSettings::default()).unwrap();

        assert_eq!(solution.method, SolutionMethod::Newton);
        assert_eq!(solution.bisection_iterations, 0);
        assert!(Radiative.residual(solution.temperature).abs() < 1e-3);
    }

    #[test]
    fn test_cycling_newton_falls_back_to_bisection() {
        // Iterates alternate between 292 and 288 with opposite residual signs
        let solution = solve(&Cycling, 292.0, &SolverSettings::default()).unwrap();

        assert_eq!(solution.method, SolutionMethod::Bisection);
        assert!(solution.bisection_iterations > 0);
        assert!(solution.final_step <= 1e-4);
        assert!((solution.temperature - 290.0).abs() < 1e-3);
    }

    #[test]
    fn test_no_sign_change_is_non_convergent() {
        let settings = SolverSettings {
            max_newton_iterations: 20,
            ..SolverSettings::default()
        };
        let solution = solve(&NoRoot, 300.0, &settings).unwrap();

        assert_eq!(solution.method, SolutionMethod::NonConvergent);
        assert!(!solution.is_converged());
        assert!(solution.temperature.is_finite());
    }

    #[test]
    fn test_history_capacity_is_enforced() {
        let settings = SolverSettings {
            history_capacity: 10,
            ..SolverSettings::default()
        };
        let result = solve(&Cycling, 292.0, &settings);

        assert_eq!(
            result.unwrap_err(),
            SolverError::HistoryExhausted { capacity: 10 }
        );
    }

    #[test]
    fn test_sign_change_detection() {
        let mut history = IterationHistory::with_capacity(4);
        history.push(290.0, 5.0).unwrap();
        assert!(history.sign_change().is_none());

        history.push(291.0, -3.0).unwrap();
        let bracket = history.sign_change().unwrap();
        assert_eq!(bracket.latest, (291.0, -3.0));
        assert_eq!(bracket.previous, (290.0, 5.0));
    }

    #[test]
    fn test_settings_partial_deserialization() {
        let json = r#"{"tolerance": 1e-6}"#;
        let settings: SolverSettings =
            serde_json::from_str(json).expect("Partial deserialization failed");

        assert!((settings.tolerance - 1e-6).abs() < 1e-15);
        assert_eq!(settings.max_newton_iterations, 100);
        assert_eq!(settings.history_capacity, 500);
    }
}
