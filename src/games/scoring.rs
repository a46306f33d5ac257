//! Speed-weighted scoring shared by the trivia-style games, plus the
//! rank-based award used by bingo.

/// Points for a correct answer after `elapsed` seconds of a `limit`-second
/// round. The award scales linearly from 100% of `base` (instant answer)
/// down to 50% (answer at the limit), and never drops below `floor_min`.
pub fn speed_weighted_points(base: i64, elapsed: f64, limit: f64, floor_min: i64) -> i64 {
    let time_factor = (1.0 - elapsed / limit).clamp(0.0, 1.0);
    let scaled = (base as f64 * (0.5 + 0.5 * time_factor)).floor() as i64;
    scaled.max(floor_min)
}

/// Bingo award for the `rank`-th valid claim (1-based): `step` points less
/// per position behind the first winner, floored at `floor_min`.
pub fn ranked_points(base: i64, rank: usize, step: i64, floor_min: i64) -> i64 {
    let behind = rank.saturating_sub(1) as i64;
    (base - behind * step).max(floor_min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_answer_earns_nearly_full_base() {
        // 3s of a 30s limit with base 10: floor(10 * 0.95) = 9
        assert_eq!(speed_weighted_points(10, 3.0, 30.0, 1), 9);
    }

    #[test]
    fn instant_answer_earns_full_base() {
        assert_eq!(speed_weighted_points(10, 0.0, 30.0, 1), 10);
    }

    #[test]
    fn answer_at_limit_earns_half_base() {
        assert_eq!(speed_weighted_points(10, 30.0, 30.0, 1), 5);
    }

    #[test]
    fn overdue_answer_is_clamped_to_half_base() {
        // elapsed past the limit must not go below the 50% weighting
        assert_eq!(speed_weighted_points(10, 90.0, 30.0, 1), 5);
    }

    #[test]
    fn monotonically_non_increasing_in_elapsed() {
        let mut prev = i64::MAX;
        for tenths in 0..=600 {
            let elapsed = tenths as f64 / 10.0;
            let points = speed_weighted_points(10, elapsed, 30.0, 1);
            assert!(points <= prev, "points increased at elapsed={elapsed}");
            prev = points;
        }
    }

    #[test]
    fn never_below_floor() {
        assert_eq!(speed_weighted_points(1, 30.0, 30.0, 1), 1);
        assert_eq!(speed_weighted_points(2, 29.0, 30.0, 2), 2);
    }

    #[test]
    fn ranked_awards_decrease_by_step() {
        assert_eq!(ranked_points(10, 1, 2, 2), 10);
        assert_eq!(ranked_points(10, 2, 2, 2), 8);
        assert_eq!(ranked_points(10, 3, 2, 2), 6);
    }

    #[test]
    fn ranked_awards_floor_at_minimum() {
        assert_eq!(ranked_points(10, 6, 2, 2), 2);
        assert_eq!(ranked_points(10, 100, 2, 2), 2);
    }
}
