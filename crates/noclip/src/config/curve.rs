use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveKey {
    pub input: f32,
    pub output: f32,
}

/// Piecewise-linear mapping from VR input magnitude to a speed multiplier.
///
/// Keys are kept sorted by input. Inputs outside the keyed range clamp to the
/// first or last key, so the curve never extrapolates past its end values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<CurveKey>", into = "Vec<CurveKey>")]
pub struct InputCurve {
    keys: Vec<CurveKey>,
}

impl Default for InputCurve {
    fn default() -> Self {
        Self::identity()
    }
}

impl InputCurve {
    pub fn identity() -> Self {
        Self {
            keys: vec![
                CurveKey {
                    input: 0.0,
                    output: 0.0,
                },
                CurveKey {
                    input: 1.0,
                    output: 1.0,
                },
            ],
        }
    }

    /// Builds a curve from arbitrary keys. Non-finite keys are dropped and
    /// outputs are clamped to `0.0..=1.0`. An empty or decreasing key set falls
    /// back to the identity curve.
    pub fn from_keys(keys: impl IntoIterator<Item = CurveKey>) -> Self {
        let mut keys: Vec<CurveKey> = keys
            .into_iter()
            .filter(|key| key.input.is_finite() && key.output.is_finite())
            .map(|key| CurveKey {
                input: key.input,
                output: key.output.clamp(0.0, 1.0),
            })
            .collect();
        if keys.is_empty() {
            return Self::identity();
        }
        keys.sort_by(|a, b| a.input.total_cmp(&b.input));
        keys.dedup_by(|later, earlier| later.input == earlier.input);
        if keys.windows(2).any(|pair| pair[1].output < pair[0].output) {
            return Self::identity();
        }
        Self { keys }
    }

    pub fn keys(&self) -> &[CurveKey] {
        &self.keys
    }

    pub fn evaluate(&self, input: f32) -> f32 {
        let (Some(first), Some(last)) = (self.keys.first(), self.keys.last()) else {
            return input;
        };
        if input.is_nan() || input <= first.input {
            return first.output;
        }
        if input >= last.input {
            return last.output;
        }

        let upper = self.keys.partition_point(|key| key.input <= input);
        let lo = self.keys[upper - 1];
        let hi = self.keys[upper];
        let span = hi.input - lo.input;
        if span <= f32::EPSILON {
            return hi.output;
        }
        let t = (input - lo.input) / span;
        lo.output + (hi.output - lo.output) * t
    }
}

impl From<Vec<CurveKey>> for InputCurve {
    fn from(keys: Vec<CurveKey>) -> Self {
        Self::from_keys(keys)
    }
}

impl From<InputCurve> for Vec<CurveKey> {
    fn from(curve: InputCurve) -> Self {
        curve.keys
    }
}
