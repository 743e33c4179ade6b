use super::ConfigError;
use core::fmt::{Display, Formatter, Result as FmtResult};
use serde::{Deserialize, Serialize};

/// A priority input outside the domain of the priority functions.
#[derive(Debug, Clone, Copy, PartialEq, thiserror::Error)]
#[error("priority input must be a non-negative number, got {0}")]
pub struct InvalidInput(pub f64);

/// Maps a cost input onto a priority weight in `[0, 1]`.
///
/// Both variants are non-increasing in their input: cheap metrics get weights close to 1
/// and expensive ones decay towards 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PriorityFunction {
    /// `exp(-k * input)`
    ExponentialDecay { k: f64 },

    /// `1 / (1 + input)`
    Reciprocal,
}

impl PriorityFunction {
    /// Check the function's parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            Self::ExponentialDecay { k } if !(k.is_finite() && k > 0.0) => Err(ConfigError::InvalidDecayRate(k)),
            Self::ExponentialDecay { .. } | Self::Reciprocal => Ok(()),
        }
    }

    /// Compute the priority weight for `input`.
    ///
    /// Negative and NaN inputs are rejected rather than clamped. Positive infinity is a
    /// valid input and yields 0.
    pub fn weight(&self, input: f64) -> Result<f64, InvalidInput> {
        if input.is_nan() || input < 0.0 {
            return Err(InvalidInput(input));
        }

        let weight = match *self {
            Self::ExponentialDecay { k } => (-k * input).exp(),
            Self::Reciprocal => 1.0 / (1.0 + input),
        };

        Ok(weight.clamp(0.0, 1.0))
    }
}

impl Default for PriorityFunction {
    fn default() -> Self {
        Self::ExponentialDecay { k: 0.5 }
    }
}

impl Display for PriorityFunction {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::ExponentialDecay { k } => write!(f, "exponential decay (k = {k})"),
            Self::Reciprocal => write!(f, "reciprocal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUTS: &[f64] = &[0.0, 0.001, 0.5, 1.0, 2.0, 4.0, 10.0, 1e6, f64::INFINITY];

    fn variants() -> [PriorityFunction; 4] {
        [
            PriorityFunction::ExponentialDecay { k: 1.0 },
            PriorityFunction::ExponentialDecay { k: 0.01 },
            PriorityFunction::ExponentialDecay { k: 25.0 },
            PriorityFunction::Reciprocal,
        ]
    }

    #[test]
    fn weights_stay_in_unit_interval() {
        for function in variants() {
            for &input in INPUTS {
                let weight = function.weight(input).unwrap();
                assert!((0.0..=1.0).contains(&weight), "{function} gave {weight} for {input}");
            }
        }
    }

    #[test]
    fn weights_are_non_increasing() {
        for function in variants() {
            let weights: Vec<f64> = INPUTS.iter().map(|&input| function.weight(input).unwrap()).collect();
            assert!(weights.windows(2).all(|pair| pair[0] >= pair[1]), "{function} is not monotonic: {weights:?}");
        }
    }

    #[test]
    fn exponential_decay_endpoints() {
        let function = PriorityFunction::ExponentialDecay { k: 1.0 };
        assert!((function.weight(0.0).unwrap() - 1.0).abs() < 1e-12);
        assert!(function.weight(f64::INFINITY).unwrap().abs() < 1e-12);
        assert!((function.weight(1.0).unwrap() - (-1.0f64).exp()).abs() < 1e-12);
    }

    #[test]
    fn reciprocal_values() {
        let function = PriorityFunction::Reciprocal;
        assert!((function.weight(0.0).unwrap() - 1.0).abs() < f64::EPSILON);
        assert!((function.weight(1.0).unwrap() - 0.5).abs() < f64::EPSILON);
        assert!((function.weight(3.0).unwrap() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn negative_and_nan_inputs_are_rejected() {
        for function in variants() {
            assert_eq!(function.weight(-0.5), Err(InvalidInput(-0.5)));
            assert_eq!(function.weight(f64::NEG_INFINITY), Err(InvalidInput(f64::NEG_INFINITY)));
            assert!(function.weight(f64::NAN).is_err());
        }
    }

    #[test]
    fn decay_rate_must_be_positive() {
        assert!(PriorityFunction::ExponentialDecay { k: 0.0 }.validate().is_err());
        assert!(PriorityFunction::ExponentialDecay { k: -1.0 }.validate().is_err());
        assert!(PriorityFunction::ExponentialDecay { k: f64::NAN }.validate().is_err());
        PriorityFunction::ExponentialDecay { k: 0.1 }.validate().unwrap();
        PriorityFunction::Reciprocal.validate().unwrap();
    }

    #[test]
    fn parses_from_toml() {
        #[derive(Deserialize)]
        struct Wrapper {
            priority_function: PriorityFunction,
        }

        let decay: Wrapper = toml::from_str("[priority_function]\nkind = \"exponential_decay\"\nk = 2.0\n").unwrap();
        assert_eq!(decay.priority_function, PriorityFunction::ExponentialDecay { k: 2.0 });

        let reciprocal: Wrapper = toml::from_str("priority_function = { kind = \"reciprocal\" }\n").unwrap();
        assert_eq!(reciprocal.priority_function, PriorityFunction::Reciprocal);
    }
}
