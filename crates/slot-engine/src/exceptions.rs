//! Remove recurring intervals cancelled by date-specific exceptions.
//!
//! An exception cancels one declared interval verbatim: the date, start and
//! end strings must all be equal. A partially overlapping exception does
//! nothing.

use crate::schedule::{Exception, Interval};

/// Keep the intervals of `day_key` that no exception cancels, in input order.
pub fn filter_exceptions<'a>(
    intervals: &'a [Interval],
    exceptions: &[Exception],
    day_key: &str,
) -> Vec<&'a Interval> {
    retain_uncancelled(intervals, |interval| interval, exceptions, day_key)
}

/// [`filter_exceptions`] over any items that carry an interval, such as
/// intervals already paired with their parsed minute bounds.
pub fn retain_uncancelled<'a, T, F>(
    items: &'a [T],
    interval_of: F,
    exceptions: &[Exception],
    day_key: &str,
) -> Vec<&'a T>
where
    F: Fn(&T) -> &Interval,
{
    let todays: Vec<&Exception> = exceptions.iter().filter(|e| e.date == day_key).collect();

    if todays.is_empty() {
        return items.iter().collect();
    }

    items
        .iter()
        .filter(|item| {
            let interval = interval_of(item);
            !todays.iter().any(|e| e.cancels(day_key, interval))
        })
        .collect()
}
