//! Progress arithmetic shared by the pipelines.
//!
//! Progress is an integer percentage, reported synchronously through a plain
//! `FnMut` sink. Sinks observe only; the pipeline waits for each call.

/// Round half toward positive infinity, the way browsers round.
pub(crate) fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Percentage of `done` out of `total` items, rounded. `total` must be non-zero.
pub(crate) fn percent(done: usize, total: usize) -> u8 {
    debug_assert!(total > 0);
    round_half_up(done as f64 / total as f64 * 100.0).clamp(0.0, 100.0) as u8
}

/// Progress reported before item `index` of `total` starts.
///
/// Capped at 99 so that 100 is only ever reported once, after the last item.
pub(crate) fn before_item(index: usize, total: usize) -> u8 {
    percent(index, total).min(99)
}

/// Overall batch progress while file `index` of `count` reports `file_progress`.
pub fn overall_progress(index: usize, count: usize, file_progress: u8) -> f64 {
    (index as f64 * 100.0 + f64::from(file_progress)) / count as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_halves_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(59.4), 59.0);
    }

    #[test]
    fn percent_of_pages_done() {
        assert_eq!(percent(0, 3), 0);
        assert_eq!(percent(1, 3), 33);
        assert_eq!(percent(2, 3), 67);
        assert_eq!(percent(1, 8), 13);
        assert_eq!(percent(3, 3), 100);
    }

    #[test]
    fn long_documents_hold_at_99_before_the_last_page() {
        assert_eq!(percent(200, 201), 100);
        assert_eq!(before_item(200, 201), 99);
        assert_eq!(before_item(0, 201), 0);
    }

    #[test]
    fn overall_composes_file_slices() {
        assert_eq!(overall_progress(0, 4, 0), 0.0);
        assert_eq!(overall_progress(1, 4, 50), 37.5);
        assert_eq!(overall_progress(3, 4, 100), 100.0);
    }
}
