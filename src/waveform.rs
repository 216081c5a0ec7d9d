//! Waveform bucketization for fixed-width amplitude displays.
//!
//! Downsamples an amplitude sequence (live metering or a finished note)
//! into a fixed number of averaged buckets, then maps each bucket to a
//! bar height for rendering.

/// Amplitude (dB) treated as no-signal
pub const SILENCE_FLOOR_DB: f32 = -160.0;

/// Number of display buckets used by the note list waveform
pub const DEFAULT_BUCKETS: usize = 60;

/// Display range: amplitudes below this clamp to the minimum bar height
pub const MIN_DISPLAY_DB: f32 = -60.0;
/// Display range: amplitudes above this clamp to the maximum bar height
pub const MAX_DISPLAY_DB: f32 = 0.0;

/// Bar height (px) at or below the display floor
pub const MIN_BAR_HEIGHT: f32 = 5.0;
/// Bar height (px) at or above 0 dB
pub const MAX_BAR_HEIGHT: f32 = 50.0;

/// Downsample `samples` into exactly `buckets` averaged segments.
///
/// Bucket `i` averages the half-open window
/// `[floor(i * n / k), ceil((i + 1) * n / k))`. An empty window (empty
/// input, or fewer samples than buckets) yields [`SILENCE_FLOOR_DB`]
/// rather than a NaN mean.
pub fn bucketize(samples: &[f32], buckets: usize) -> Vec<f32> {
    let n = samples.len();
    let mut out = Vec::with_capacity(buckets);

    for i in 0..buckets {
        let start = i * n / buckets;
        let end = ((i + 1) * n).div_ceil(buckets);

        if start < end {
            let window = &samples[start..end];
            let sum: f32 = window.iter().sum();
            out.push(sum / window.len() as f32);
        } else {
            out.push(SILENCE_FLOOR_DB);
        }
    }

    out
}

/// Map an amplitude (dB) to a bar height in px.
///
/// Clamps to [`MIN_DISPLAY_DB`, `MAX_DISPLAY_DB`] and interpolates
/// linearly to [`MIN_BAR_HEIGHT`, `MAX_BAR_HEIGHT`].
pub fn bar_height(db: f32) -> f32 {
    let db = if db.is_finite() {
        db.clamp(MIN_DISPLAY_DB, MAX_DISPLAY_DB)
    } else {
        MIN_DISPLAY_DB
    };
    let t = (db - MIN_DISPLAY_DB) / (MAX_DISPLAY_DB - MIN_DISPLAY_DB);
    MIN_BAR_HEIGHT + t * (MAX_BAR_HEIGHT - MIN_BAR_HEIGHT)
}

/// Bucketize and map to bar heights in one pass
pub fn bar_heights(samples: &[f32], buckets: usize) -> Vec<f32> {
    bucketize(samples, buckets)
        .into_iter()
        .map(bar_height)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_always_produces_exactly_k_buckets() {
        for n in 0..=50 {
            let samples: Vec<f32> = (0..n).map(|i| -(i as f32)).collect();
            for k in 1..=10 {
                assert_eq!(bucketize(&samples, k).len(), k, "n={} k={}", n, k);
            }
        }
    }

    #[test]
    fn test_identity_when_n_equals_k() {
        let samples = [-40.0, -35.0, -30.0, -20.0, -10.0];
        assert_eq!(bucketize(&samples, 5), samples.to_vec());
    }

    #[test]
    fn test_empty_input_yields_silence_floor() {
        let out = bucketize(&[], 4);
        assert_eq!(out, vec![SILENCE_FLOOR_DB; 4]);
    }

    #[test]
    fn test_fewer_samples_than_buckets_fills_empty_windows() {
        // n=2, k=4: windows are [0,1), [1,1), [1,2), [2,2)
        let out = bucketize(&[-10.0, -20.0], 4);
        assert_eq!(out.len(), 4);
        assert_eq!(out[0], -10.0);
        assert_eq!(out[1], SILENCE_FLOOR_DB);
        assert_eq!(out[2], -20.0);
        assert_eq!(out[3], SILENCE_FLOOR_DB);
    }

    #[test]
    fn test_every_sample_is_covered_by_some_window() {
        for n in 1..=40 {
            for k in 1..=12 {
                let mut covered = vec![false; n];
                for i in 0..k {
                    let start = i * n / k;
                    let end = ((i + 1) * n).div_ceil(k);
                    for slot in covered.iter_mut().take(end).skip(start) {
                        *slot = true;
                    }
                }
                assert!(covered.iter().all(|&c| c), "n={} k={}", n, k);
            }
        }
    }

    #[test]
    fn test_bucket_means_average_their_window() {
        // n=4, k=2: windows [0,2) and [2,4)
        let out = bucketize(&[-40.0, -20.0, -10.0, -30.0], 2);
        assert_eq!(out, vec![-30.0, -20.0]);
    }

    #[test]
    fn test_deterministic_across_calls() {
        let samples: Vec<f32> = (0..97).map(|i| -120.0 + i as f32).collect();
        assert_eq!(bucketize(&samples, 60), bucketize(&samples, 60));
    }

    #[test]
    fn test_bar_height_clamps_both_ends() {
        assert_eq!(bar_height(-160.0), MIN_BAR_HEIGHT);
        assert_eq!(bar_height(-60.0), MIN_BAR_HEIGHT);
        assert_eq!(bar_height(0.0), MAX_BAR_HEIGHT);
        assert_eq!(bar_height(10.0), MAX_BAR_HEIGHT);
        assert_eq!(bar_height(f32::NAN), MIN_BAR_HEIGHT);
    }

    #[test]
    fn test_bar_height_is_linear_in_between() {
        assert_eq!(bar_height(-30.0), (MIN_BAR_HEIGHT + MAX_BAR_HEIGHT) / 2.0);
    }

    #[test]
    fn test_bar_heights_composes() {
        let heights = bar_heights(&[-60.0, 0.0], 2);
        assert_eq!(heights, vec![MIN_BAR_HEIGHT, MAX_BAR_HEIGHT]);
    }
}
