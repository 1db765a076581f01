use chrono::{DateTime, Duration, FixedOffset};

/// # Returning players
///
/// - The player's last match was played at time T.
/// - The current match is played at time D.
/// - If (D - T) exceeds the inactivity gap, the player is treated as returning:
///     their next games are rated in a short window with a doubled K.
///
/// A player with no previous match is new, not returning.
pub fn is_returning(
    last_match: Option<DateTime<FixedOffset>>,
    current_time: DateTime<FixedOffset>,
    gap_days: i64
) -> bool {
    match last_match {
        Some(last) => !is_active(last, current_time, gap_days),
        None => false
    }
}

/// Returns true if the player has played within the last `gap_days` days.
fn is_active(last_match: DateTime<FixedOffset>, current_time: DateTime<FixedOffset>, gap_days: i64) -> bool {
    current_time - last_match <= Duration::days(gap_days)
}
