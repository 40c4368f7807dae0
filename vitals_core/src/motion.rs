//! Movement intensity from tri-axial acceleration.

use crate::error::Axis;
use crate::{AxisColumns, Error, IntensityPoint, Result, Sample};

/// Elementwise `sqrt(x^2 + y^2 + z^2)` over the three axes.
///
/// Every axis must be present, of equal length and finite, and so must
/// every resulting magnitude.
pub fn magnitude(axes: &AxisColumns) -> Result<Vec<f64>> {
    let x = axes.x.as_deref().ok_or(Error::MissingAxis(Axis::X))?;
    let y = axes.y.as_deref().ok_or(Error::MissingAxis(Axis::Y))?;
    let z = axes.z.as_deref().ok_or(Error::MissingAxis(Axis::Z))?;

    if x.len() != y.len() || x.len() != z.len() {
        return Err(Error::AxisLengthMismatch {
            x: x.len(),
            y: y.len(),
            z: z.len(),
        });
    }

    for (axis, values) in [(Axis::X, x), (Axis::Y, y), (Axis::Z, z)] {
        if let Some((i, value)) = values.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(Error::InvalidNumeric {
                field: format!("{} (sample {})", axis, i),
                value: value.to_string(),
            });
        }
    }

    x.iter()
        .zip(y)
        .zip(z)
        .enumerate()
        .map(|(i, ((x, y), z))| {
            let value = (x * x + y * y + z * z).sqrt();
            // Finite components can still overflow once squared
            if value.is_finite() {
                Ok(value)
            } else {
                Err(Error::InvalidNumeric {
                    field: format!("magnitude (sample {})", i),
                    value: value.to_string(),
                })
            }
        })
        .collect()
}

/// Timestamped intensity for every sample that carries acceleration
pub fn intensity_series(samples: &[Sample]) -> Vec<IntensityPoint> {
    samples
        .iter()
        .filter_map(|sample| {
            sample.accel.map(|accel| IntensityPoint {
                timestamp: sample.timestamp,
                magnitude: accel.magnitude(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{SampleSource, Vector3};
    use chrono::{Duration, Utc};

    fn axes(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> AxisColumns {
        AxisColumns {
            x: Some(x),
            y: Some(y),
            z: Some(z),
        }
    }

    #[test]
    fn test_vertical_gravity_is_exact() {
        for g in [1.0, 9.81, 12.5] {
            let result = magnitude(&axes(vec![0.0], vec![0.0], vec![g])).unwrap();
            assert_eq!(result, vec![g]);
        }
    }

    #[test]
    fn test_pythagorean_magnitude() {
        let result = magnitude(&axes(vec![3.0, 1.0], vec![4.0, 2.0], vec![0.0, 2.0])).unwrap();
        assert_eq!(result, vec![5.0, 3.0]);
    }

    #[test]
    fn test_magnitude_is_already_scalar() {
        let first = magnitude(&axes(vec![3.0, 0.0], vec![4.0, 6.0], vec![0.0, 8.0])).unwrap();
        let zeros = vec![0.0; first.len()];
        let again = magnitude(&axes(first.clone(), zeros.clone(), zeros)).unwrap();
        assert_eq!(first, again);
    }

    #[test]
    fn test_missing_axis() {
        let columns = AxisColumns {
            x: Some(vec![1.0]),
            y: None,
            z: Some(vec![1.0]),
        };
        assert!(matches!(
            magnitude(&columns),
            Err(Error::MissingAxis(Axis::Y))
        ));
        assert!(matches!(
            magnitude(&AxisColumns::default()),
            Err(Error::MissingAxis(Axis::X))
        ));
    }

    #[test]
    fn test_unequal_lengths_rejected() {
        assert!(matches!(
            magnitude(&axes(vec![1.0, 2.0], vec![1.0], vec![1.0, 2.0])),
            Err(Error::AxisLengthMismatch { x: 2, y: 1, z: 2 })
        ));
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(matches!(
            magnitude(&axes(vec![1.0], vec![f64::INFINITY], vec![1.0])),
            Err(Error::InvalidNumeric { .. })
        ));
    }

    #[test]
    fn test_overflowing_magnitude_rejected() {
        match magnitude(&axes(vec![0.0, 1e200], vec![1.0, 1e200], vec![0.0, 0.0])) {
            Err(Error::InvalidNumeric { field, value }) => {
                assert_eq!(field, "magnitude (sample 1)");
                assert_eq!(value, "inf");
            }
            other => panic!("Expected InvalidNumeric, got {:?}", other),
        }
    }

    #[test]
    fn test_intensity_series_skips_samples_without_accel() {
        let now = Utc::now();
        let sample = |secs: i64, accel: Option<Vector3>| Sample {
            timestamp: now + Duration::seconds(secs),
            bpm: Some(70.0),
            hrv: None,
            spo2: None,
            accel,
            gyro: None,
            source: SampleSource::Simulated,
        };

        let samples = vec![
            sample(0, Some(Vector3::new(0.0, 0.0, 9.81))),
            sample(2, None),
            sample(4, Some(Vector3::new(3.0, 4.0, 0.0))),
        ];

        let series = intensity_series(&samples);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].magnitude, 9.81);
        assert_eq!(series[1].magnitude, 5.0);
        assert_eq!(series[1].timestamp, samples[2].timestamp);
    }
}
