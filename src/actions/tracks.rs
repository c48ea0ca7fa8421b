//! Drag trajectory planner
//!
//! Produces the horizontal move deltas for a simulated slider drag: a
//! fast initial motion that decelerates toward the target, following a
//! quadratic speed curve.

/// Fixed step count; yields `TRACK_STEPS - 1` deltas
pub const TRACK_STEPS: usize = 33;

/// Move deltas summing to `distance`, largest first
///
/// Weight 1 for the final step, `i² - 1` for step `i > 1`, emitted in
/// descending step order and normalized so the deltas sum to the
/// requested distance. Pure function of the distance.
pub fn build_tracks(distance: f64) -> Vec<f64> {
    let weights: Vec<f64> = (1..TRACK_STEPS)
        .rev()
        .map(|i| if i == 1 { 1.0 } else { (i * i - 1) as f64 })
        .collect();
    let total: f64 = weights.iter().sum();
    weights.iter().map(|w| distance * w / total).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_track_count_and_sum() {
        let tracks = build_tracks(100.0);
        assert_eq!(tracks.len(), 32);
        let sum: f64 = tracks.iter().sum();
        assert!((sum - 100.0).abs() < 1e-6, "sum {}", sum);
    }

    #[test]
    fn test_tracks_decelerate() {
        let tracks = build_tracks(213.5);
        for pair in tracks.windows(2) {
            assert!(pair[0] >= pair[1], "{} < {}", pair[0], pair[1]);
        }
        assert!(tracks[0] > tracks[31]);
    }

    #[test]
    fn test_tracks_all_positive() {
        for distance in [1.0, 57.3, 100.0, 480.0] {
            assert!(build_tracks(distance).iter().all(|d| *d > 0.0));
        }
    }

    #[test]
    fn test_tracks_scale_linearly() {
        let one = build_tracks(1.0);
        let ten = build_tracks(10.0);
        for (a, b) in one.iter().zip(ten.iter()) {
            assert!((a * 10.0 - b).abs() < 1e-9);
        }
    }
}
