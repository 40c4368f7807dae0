//! Heart rate and HRV from a raw ECG waveform.
//!
//! Beats are R-peaks found by a prominence/distance peak search:
//!
//! 1. Local maxima (flat tops resolve to their middle sample)
//! 2. Peaks closer than the refractory distance are dropped, tallest first
//! 3. Peaks whose prominence is below the threshold are dropped
//!
//! RR intervals then give `bpm = 60 / mean(RR)` and
//! `RMSSD = sqrt(mean(diff(RR)^2))`, reported in milliseconds.

use crate::config::EcgConfig;
use crate::{EcgWaveform, Error, Result};

/// Heart metrics derived from one waveform
#[derive(Clone, Debug, PartialEq)]
pub struct HeartMetrics {
    pub bpm: f64,
    pub hrv_rmssd_ms: f64,
    /// Sample index of every detected beat
    pub peaks: Vec<usize>,
    /// Seconds between consecutive beats
    pub rr_intervals_s: Vec<f64>,
}

/// Derive BPM and RMSSD from `waveform`.
///
/// The waveform is only borrowed, so on `InsufficientSignal` the caller still
/// holds the raw signal for display.
pub fn analyze(waveform: &EcgWaveform, config: &EcgConfig) -> Result<HeartMetrics> {
    let fs = waveform.sample_rate_hz;
    if !fs.is_finite() || fs <= 0.0 {
        return Err(Error::InvalidNumeric {
            field: "sample_rate_hz".into(),
            value: fs.to_string(),
        });
    }

    if let Some((i, value)) = waveform
        .amplitudes
        .iter()
        .enumerate()
        .find(|(_, v)| !v.is_finite())
    {
        return Err(Error::InvalidNumeric {
            field: format!("ECG (sample {})", i),
            value: value.to_string(),
        });
    }

    let min_distance = (fs * config.min_peak_distance_s).ceil().max(1.0) as usize;
    let peaks = find_peaks(&waveform.amplitudes, min_distance, config.min_prominence);

    tracing::debug!(
        "Detected {} beats in {} samples (distance {}, prominence {})",
        peaks.len(),
        waveform.amplitudes.len(),
        min_distance,
        config.min_prominence
    );

    if peaks.len() < 2 {
        return Err(Error::InsufficientSignal { peaks: peaks.len() });
    }

    let rr_intervals_s = rr_intervals(&peaks, fs);
    let bpm = 60.0 / mean(&rr_intervals_s);

    let successive: Vec<f64> = rr_intervals_s
        .windows(2)
        .map(|w| (w[1] - w[0]).powi(2))
        .collect();
    // A single RR interval has no successive difference: mean of nothing is NaN
    let hrv_rmssd_ms = mean(&successive).sqrt() * 1000.0;

    if !bpm.is_finite() || !hrv_rmssd_ms.is_finite() {
        tracing::debug!("Non-finite heart metrics from {} beats", peaks.len());
        return Err(Error::InsufficientSignal { peaks: peaks.len() });
    }

    Ok(HeartMetrics {
        bpm,
        hrv_rmssd_ms,
        peaks,
        rr_intervals_s,
    })
}

/// Seconds between consecutive peak indices
pub fn rr_intervals(peaks: &[usize], sample_rate_hz: f64) -> Vec<f64> {
    peaks
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 / sample_rate_hz)
        .collect()
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Indices of peaks at least `min_distance` samples apart with prominence of
/// at least `min_prominence`, in ascending order.
pub fn find_peaks(signal: &[f64], min_distance: usize, min_prominence: f64) -> Vec<usize> {
    let candidates = local_maxima(signal);
    let spaced = select_by_distance(signal, &candidates, min_distance);
    spaced
        .into_iter()
        .filter(|&peak| prominence(signal, peak) >= min_prominence)
        .collect()
}

/// Strict local maxima; a plateau counts once, at its middle sample
fn local_maxima(signal: &[f64]) -> Vec<usize> {
    let mut maxima = Vec::new();
    if signal.len() < 3 {
        return maxima;
    }

    let last = signal.len() - 1;
    let mut i = 1;
    while i < last {
        if signal[i - 1] < signal[i] {
            let mut ahead = i + 1;
            while ahead < last && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                maxima.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    maxima
}

/// Drop peaks within `min_distance` of a taller kept peak
fn select_by_distance(signal: &[f64], peaks: &[usize], min_distance: usize) -> Vec<usize> {
    if min_distance <= 1 || peaks.len() < 2 {
        return peaks.to_vec();
    }

    let mut keep = vec![true; peaks.len()];
    let mut by_height: Vec<usize> = (0..peaks.len()).collect();
    by_height.sort_by(|&a, &b| signal[peaks[a]].total_cmp(&signal[peaks[b]]));

    for &j in by_height.iter().rev() {
        if !keep[j] {
            continue;
        }

        let mut k = j;
        while k > 0 && peaks[j] - peaks[k - 1] < min_distance {
            keep[k - 1] = false;
            k -= 1;
        }

        let mut k = j + 1;
        while k < peaks.len() && peaks[k] - peaks[j] < min_distance {
            keep[k] = false;
            k += 1;
        }
    }

    peaks
        .iter()
        .zip(keep)
        .filter_map(|(&peak, kept)| kept.then_some(peak))
        .collect()
}

/// Height of a peak above the higher of the two lowest points reachable on
/// either side before the signal climbs above the peak
fn prominence(signal: &[f64], peak: usize) -> f64 {
    let height = signal[peak];

    let mut left_min = height;
    for &value in signal[..=peak].iter().rev() {
        if value > height {
            break;
        }
        left_min = left_min.min(value);
    }

    let mut right_min = height;
    for &value in &signal[peak..] {
        if value > height {
            break;
        }
        right_min = right_min.min(value);
    }

    height - left_min.max(right_min)
}
