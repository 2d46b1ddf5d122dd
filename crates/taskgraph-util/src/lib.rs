//! # taskgraph-util
//!
//! A peripheral work-splitting helper: given a total amount of work and
//! a worker count, divide `[0, total)` into that many contiguous,
//! near-equal-length ranges. Not consumed by the engine itself -
//! callers use it to turn "parallelize this loop across N workers" into
//! N index ranges they then wrap in `Task`s of their own.
//!
//! Total work divided by worker count gives a base chunk size:
//! `total / workers` with `total % workers` left over. The leftover is
//! distributed one extra element at a time to the first
//! `total % workers` ranges, so no range differs from another by more
//! than one element.

use std::ops::Range;

/// Divide `[0, total)` into `workers` contiguous half-open ranges whose
/// lengths differ by at most one element. The first `total % workers`
/// ranges get `total / workers + 1` elements each; the rest get
/// `total / workers`. Ranges are returned in order and, concatenated,
/// cover `[0, total)` with no gaps or overlaps.
///
/// `workers` must be at least 1. An empty `total` yields `workers` empty
/// ranges rather than an empty `Vec`, so callers can always zip the
/// result against a fixed-size worker list.
///
/// # Panics
///
/// Panics if `workers` is 0.
pub fn split_range(total: usize, workers: usize) -> Vec<Range<usize>> {
    assert!(workers > 0, "split_range: workers must be at least 1");

    let base = total / workers;
    let remainder = total % workers;

    let mut ranges = Vec::with_capacity(workers);
    let mut cursor = 0;
    for i in 0..workers {
        let len = if i < remainder { base + 1 } else { base };
        let end = cursor + len;
        ranges.push(cursor..end);
        cursor = end;
    }
    ranges
}
