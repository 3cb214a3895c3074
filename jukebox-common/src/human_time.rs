//! Human-readable duration formatting for track panels

use std::time::Duration;

/// Duration reported by the engine for live streams with no known length
pub const LIVE_DURATION_MS: u64 = u64::MAX;

const HOUR_SECS: u64 = 3600;
const EXTENDED_FORMAT_MIN: u64 = 90_000; // >= 25h → Dd-H:MM:SS

/// Format a track duration for display.
///
/// - `M:SS` below one hour
/// - `H:MM:SS` below 25 hours
/// - `Dd-H:MM:SS` from 25 hours up
/// - `live` for [`LIVE_DURATION_MS`]
///
/// # Examples
///
/// ```
/// use jukebox_common::human_time::format_track_duration;
///
/// assert_eq!(format_track_duration(45_000), "0:45");
/// assert_eq!(format_track_duration(330_000), "5:30");
/// assert_eq!(format_track_duration(3_661_000), "1:01:01");
/// assert_eq!(format_track_duration(90_000_000), "1d-1:00:00");
/// ```
pub fn format_track_duration(duration_ms: u64) -> String {
    if duration_ms == LIVE_DURATION_MS {
        return "live".to_string();
    }

    let total = duration_ms / 1000;
    let secs = total % 60;
    let mins = (total % HOUR_SECS) / 60;

    if total < HOUR_SECS {
        format!("{}:{:02}", total / 60, secs)
    } else if total < EXTENDED_FORMAT_MIN {
        format!("{}:{:02}:{:02}", total / HOUR_SECS, mins, secs)
    } else {
        let days = total / 86_400;
        let hours = (total % 86_400) / HOUR_SECS;
        format!("{}d-{}:{:02}:{:02}", days, hours, mins, secs)
    }
}

/// Same as [`format_track_duration`] for a [`Duration`]
pub fn format_duration(duration: Duration) -> String {
    format_track_duration(u64::try_from(duration.as_millis()).unwrap_or(LIVE_DURATION_MS))
}
