//! Calendar-invite (.ics) builder
//!
//! A minimal VCALENDAR/VEVENT document: `KEY:VALUE` lines joined by CRLF,
//! instants rendered in UTC, newlines in the description escaped per
//! RFC 5545.

use chrono::{DateTime, Utc};

/// Input for one invite.
#[derive(Debug, Clone)]
pub struct IcsInvite {
    /// Stable unique id, derived from the reservation id
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub location: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Creation timestamp (DTSTAMP)
    pub stamp: DateTime<Utc>,
}

/// Render an invite as an .ics document.
pub fn build_ics(invite: &IcsInvite) -> String {
    [
        "BEGIN:VCALENDAR".to_string(),
        "VERSION:2.0".to_string(),
        "PRODID:-//Flats Booking//Reservations//PT-BR".to_string(),
        "CALSCALE:GREGORIAN".to_string(),
        "METHOD:PUBLISH".to_string(),
        "BEGIN:VEVENT".to_string(),
        format!("UID:{}", invite.uid),
        format!("DTSTAMP:{}", fmt_utc(invite.stamp)),
        format!("DTSTART:{}", fmt_utc(invite.start)),
        format!("DTEND:{}", fmt_utc(invite.end)),
        format!("SUMMARY:{}", invite.summary),
        format!("DESCRIPTION:{}", invite.description.replace('\n', "\\n")),
        format!("LOCATION:{}", invite.location),
        "END:VEVENT".to_string(),
        "END:VCALENDAR".to_string(),
    ]
    .join("\r\n")
}

/// `YYYYMMDDTHHMMSSZ`
fn fmt_utc(dt: DateTime<Utc>) -> String {
    dt.format("%Y%m%dT%H%M%SZ").to_string()
}
