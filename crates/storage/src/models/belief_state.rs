use serde::{Deserialize, Serialize};

use crate::error::{Result, StorageError};

/// Gaussian belief about a candidate's standing on one question.
///
/// `mu` is the estimated standing and may take any finite value. `sigma` is the
/// uncertainty around it; a belief with `sigma == 0` is treated as certain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    #[serde(alias = "Mu")]
    pub mu: f64,
    #[serde(alias = "Sigma")]
    pub sigma: f64,
}

impl BeliefState {
    /// Starting belief for a candidate nobody has voted on yet.
    pub const INITIAL: BeliefState = BeliefState {
        mu: 25.0,
        sigma: 25.0 / 3.0,
    };

    pub fn new(mu: f64, sigma: f64) -> Result<Self> {
        let belief = Self { mu, sigma };
        belief.validate()?;
        Ok(belief)
    }

    pub fn validate(&self) -> Result<()> {
        // JSON has no representation for NaN or infinity.
        if !self.mu.is_finite() {
            return Err(StorageError::validation(format!(
                "mu must be a finite number, got {}",
                self.mu
            )));
        }
        if !self.sigma.is_finite() || self.sigma < 0.0 {
            return Err(StorageError::validation(format!(
                "sigma must be a finite non-negative number, got {}",
                self.sigma
            )));
        }
        Ok(())
    }
}

impl Default for BeliefState {
    fn default() -> Self {
        Self::INITIAL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_sigma_is_rejected() {
        let result = BeliefState::new(25.0, -0.1);
        assert!(matches!(result, Err(StorageError::ValidationError(_))));
    }

    #[test]
    fn test_zero_sigma_is_accepted() {
        let belief = BeliefState::new(-3.5, 0.0).unwrap();
        assert_eq!(belief.sigma, 0.0);
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        assert!(BeliefState::new(f64::NAN, 1.0).is_err());
        assert!(BeliefState::new(1.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_initial_belief() {
        let belief = BeliefState::default();
        assert_eq!(belief.mu, 25.0);
        assert!((belief.sigma - 8.333_333_333_333_334).abs() < 1e-12);
    }

    #[test]
    fn test_legacy_capitalised_fields() {
        let belief: BeliefState = serde_json::from_str(r#"{"Mu": 28.5, "Sigma": 7.2}"#).unwrap();
        assert_eq!(belief, BeliefState { mu: 28.5, sigma: 7.2 });
    }
}
