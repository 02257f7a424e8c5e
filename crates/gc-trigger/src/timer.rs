use std::time::Duration;

/// The trigger's own interval is never shorter than the data provider's
/// advertised query interval, per spec.md §4.6: polling faster than the
/// provider can usefully answer just wastes a round trip.
pub fn effective_interval(user_interval: Duration, provider_query_interval: Duration) -> Duration {
    user_interval.max(provider_query_interval)
}

/// Builds a `tokio::time::Interval` ticking at [`effective_interval`],
/// with the first tick consumed immediately (periodic triggers shouldn't
/// fire a redundant pass at startup on top of the initial resync).
pub fn build_interval(user_interval: Duration, provider_query_interval: Duration) -> tokio::time::Interval {
    let period = effective_interval(user_interval, provider_query_interval);
    tokio::time::interval(period)
}
