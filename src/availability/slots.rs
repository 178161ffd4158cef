//! Pure interval algebra for busy-time merging and free-gap search

use crate::model::TimeRange;
use chrono::{DateTime, Duration, Utc};

/// Merge overlapping or touching ranges into the minimal covering set
///
/// Input must be sorted ascending by start time. Touching counts as overlap
/// (closed-interval semantics); the result is non-overlapping and ascending.
pub fn merge_intervals(sorted: Vec<TimeRange>) -> Vec<TimeRange> {
    let mut iter = sorted.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    let mut merged = Vec::new();
    for next in iter {
        if next.start <= current.end {
            // Overlap or touch: extend the running merge
            if next.end > current.end {
                current.end = next.end;
            }
        } else {
            merged.push(current);
            current = next;
        }
    }
    merged.push(current);
    merged
}

/// Find every gap of at least `min_duration` inside the search window
///
/// `merged_busy` must be the output of [`merge_intervals`]; its ranges may
/// lie partially or fully outside the window. Gaps are returned ascending
/// and non-overlapping.
pub fn find_free_gaps(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    merged_busy: &[TimeRange],
    min_duration: Duration,
) -> Vec<TimeRange> {
    let mut gaps = Vec::new();
    let mut cursor = window_start;

    for busy in merged_busy {
        if busy.start > cursor {
            let gap_end = busy.start.min(window_end);
            if gap_end - cursor >= min_duration {
                gaps.push(TimeRange {
                    start: cursor,
                    end: gap_end,
                });
            }
        }
        cursor = cursor.max(busy.end.min(window_end));
        if cursor >= window_end {
            break;
        }
    }

    // Trailing gap after the last busy range
    if cursor < window_end && window_end - cursor >= min_duration {
        gaps.push(TimeRange {
            start: cursor,
            end: window_end,
        });
    }

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, hour, minute, 0).unwrap()
    }

    fn range(start: (u32, u32), end: (u32, u32)) -> TimeRange {
        TimeRange {
            start: at(start.0, start.1),
            end: at(end.0, end.1),
        }
    }

    #[test]
    fn merge_of_empty_input_is_empty() {
        assert!(merge_intervals(Vec::new()).is_empty());
    }

    #[test]
    fn merge_collapses_overlap_and_touch() {
        let merged = merge_intervals(vec![
            range((9, 0), (10, 0)),
            range((9, 30), (11, 0)),
            range((11, 0), (11, 15)),
        ]);
        assert_eq!(merged, vec![range((9, 0), (11, 15))]);
    }

    #[test]
    fn merge_keeps_disjoint_ranges_apart() {
        let merged = merge_intervals(vec![range((9, 0), (10, 0)), range((10, 1), (11, 0))]);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn merged_output_is_ascending_and_covers_no_more_than_inputs() {
        let inputs = vec![
            range((8, 0), (9, 0)),
            range((8, 30), (9, 30)),
            range((12, 0), (13, 0)),
            range((15, 0), (15, 30)),
        ];
        let input_total = inputs
            .iter()
            .map(TimeRange::duration)
            .fold(Duration::zero(), |acc, d| acc + d);
        let merged = merge_intervals(inputs);
        let merged_total = merged
            .iter()
            .map(TimeRange::duration)
            .fold(Duration::zero(), |acc, d| acc + d);
        assert!(merged_total <= input_total);
        for pair in merged.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn empty_busy_list_yields_whole_window() {
        let gaps = find_free_gaps(at(9, 0), at(17, 0), &[], Duration::minutes(30));
        assert_eq!(gaps, vec![range((9, 0), (17, 0))]);
    }

    #[test]
    fn busy_range_covering_window_yields_no_gaps() {
        let busy = [range((9, 0), (17, 0))];
        let gaps = find_free_gaps(at(9, 0), at(17, 0), &busy, Duration::minutes(30));
        assert!(gaps.is_empty());
    }

    #[test]
    fn gaps_are_filtered_by_minimum_duration() {
        // Pre-gap 9:00-10:00 fails the 90 minute bar; post-gap 10:30-12:00 passes
        let busy = [range((10, 0), (10, 30))];
        let gaps = find_free_gaps(at(9, 0), at(12, 0), &busy, Duration::minutes(90));
        assert_eq!(gaps, vec![range((10, 30), (12, 0))]);
    }

    #[test]
    fn both_qualifying_gaps_are_returned_ascending() {
        let busy = [range((10, 0), (10, 30))];
        let gaps = find_free_gaps(at(9, 0), at(12, 0), &busy, Duration::minutes(60));
        assert_eq!(gaps, vec![range((9, 0), (10, 0)), range((10, 30), (12, 0))]);
    }

    #[test]
    fn busy_ranges_outside_window_are_clamped() {
        let busy = [range((7, 0), (9, 30)), range((16, 30), (18, 0))];
        let gaps = find_free_gaps(at(9, 0), at(17, 0), &busy, Duration::minutes(30));
        assert_eq!(gaps, vec![range((9, 30), (16, 30))]);
    }

    #[test]
    fn min_duration_longer_than_window_yields_nothing() {
        let gaps = find_free_gaps(at(9, 0), at(10, 0), &[], Duration::hours(2));
        assert!(gaps.is_empty());
    }
}
