//! Event name normalization.
//!
//! Segment event names are free text ("Viewed Dashboard"). StatsD metric
//! names only tolerate a restricted alphabet, so the name is folded into
//! `[a-z0-9_]` before it becomes a metric suffix.

/// Normalize a free-text event name into a metric-safe token.
///
/// Every character is lower-cased with full Unicode case mapping; a result
/// that is a single ASCII lowercase letter or digit is kept, anything else
/// becomes a single `_`. Runs are not collapsed, so the output has exactly
/// as many characters as the input.
///
/// ```
/// use segment_relay::normalize_event_name;
///
/// assert_eq!(normalize_event_name("Viewed Dashboard"), "viewed_dashboard");
/// ```
pub fn normalize_event_name(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            let mut lower = c.to_lowercase();
            match (lower.next(), lower.next()) {
                (Some(l), None) if l.is_ascii_lowercase() || l.is_ascii_digit() => l,
                _ => '_',
            }
        })
        .collect()
}
