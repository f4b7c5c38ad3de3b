//! Fitting intervals around gaps for the local regression stage.

use std::ops::RangeInclusive;

/// Build the fitting intervals for a series with gaps at `missing`.
///
/// Each gap at `pos` opens the window `[pos - w, pos + w]`; gaps closer than
/// `w + 1` to the start or `w + 2` to the end get no window of their own.
/// A window starting before the end of the previously accepted one is merged
/// into it. A merged window is dropped when both of its first two positions
/// are gaps, when either of its last two positions is a gap, or when more
/// than 60% of its positions are gaps.
///
/// `missing` must be ascending.
pub fn gap_intervals(missing: &[usize], len: usize, half_window: usize) -> Vec<RangeInclusive<usize>> {
    let w = half_window;
    let mut spans: Vec<(usize, usize)> = Vec::new();

    for &pos in missing.iter().filter(|&&p| p > w && p + w + 1 < len) {
        let (start, end) = (pos - w, pos + w);
        match spans.last_mut() {
            // merged windows stay contiguous
            Some(last) if start < last.1 => last.1 = end,
            _ => spans.push((start, end)),
        }
    }

    let is_missing = |i: usize| missing.binary_search(&i).is_ok();
    spans
        .into_iter()
        .filter(|&(start, end)| {
            if end <= start {
                return false;
            }
            let head_open = is_missing(start) && is_missing(start + 1);
            let tail_open = is_missing(end) || is_missing(end - 1);
            if head_open || tail_open {
                return false;
            }
            let gaps = (start..=end).filter(|&i| is_missing(i)).count();
            10 * gaps <= 6 * (end - start + 1)
        })
        .map(|(start, end)| start..=end)
        .collect()
}
