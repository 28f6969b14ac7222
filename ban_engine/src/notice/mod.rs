//! Builds the message shown to a client that is refused because of a ban

use crate::{ban::BanRecord, config::NoticeConfig};

use chrono::{DateTime, Utc};
use std::time::Duration;

mod localization;
pub use localization::*;

mod resolver;
pub use resolver::*;

/// Localization keys used in ban notices
pub mod keys {
    pub const HEADER: &str = "ban-banned-1";
    pub const ISSUED_BY: &str = "ban-banned-2";
    pub const REASON: &str = "ban-banned-3";
    pub const FOOTER: &str = "ban-banned-4";
    pub const EXPIRES: &str = "ban-expires";
    pub const PERMANENT: &str = "ban-banned-permanent";
    pub const PERMANENT_APPEAL: &str = "ban-banned-permanent-appeal";
}

/// Renders ban notices.
///
/// The formatter owns only the layout and the arguments; all text comes
/// from the localizer.
pub struct NoticeFormatter<'a, L: ?Sized> {
    localizer: &'a L,
    config: &'a NoticeConfig,
}

impl<'a, L: Localizer + ?Sized> NoticeFormatter<'a, L> {
    pub fn new(localizer: &'a L, config: &'a NoticeConfig) -> Self {
        Self { localizer, config }
    }

    /// Render the five-line notice for a ban, attributing it to the given
    /// admin name.
    pub fn format(&self, record: &BanRecord, admin: &AdminName) -> String {
        let loc = self.localizer;

        [
            loc.get_string(keys::HEADER, &[]),
            loc.get_string(keys::ISSUED_BY, &[("adminName", admin.as_str())]),
            loc.get_string(keys::REASON, &[("reason", record.reason())]),
            self.expiry_line(record),
            loc.get_string(keys::FOOTER, &[]),
        ]
        .join("\n")
    }

    /// Look up the issuing admin's display name, then render the notice.
    ///
    /// The lookup is a single attempt bounded by `timeout`; if it fails for
    /// any reason the notice names the admin as "Unknown".
    pub async fn format_resolving<R: DisplayNameResolver + ?Sized>(
        &self,
        record: &BanRecord,
        resolver: &R,
        timeout: Duration,
    ) -> String {
        let admin = resolve_admin_name(resolver, record.issuing_admin().copied(), timeout).await;
        self.format(record, &admin)
    }

    fn expiry_line(&self, record: &BanRecord) -> String {
        let loc = self.localizer;

        match (record.expires_at(), record.duration()) {
            (Some(expires), Some(duration)) => {
                let minutes = format_minutes(duration);
                let time = format_expiry_time(expires);
                loc.get_string(keys::EXPIRES, &[("duration", &minutes), ("time", &time)])
            }
            _ => match self.config.appeal_link() {
                Some(link) => loc.get_string(keys::PERMANENT_APPEAL, &[("link", link)]),
                None => loc.get_string(keys::PERMANENT, &[]),
            },
        }
    }
}

/// Whole minutes, rounded half away from zero, with thousands separators
fn format_minutes(duration: chrono::Duration) -> String {
    let seconds = duration.num_milliseconds() as f64 / 1000.0;
    let minutes = (seconds / 60.0).round() as i64;

    let digits = minutes.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if minutes < 0 {
        grouped.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Long date and short time, e.g. `Monday, October 19, 2026 3:04 PM`
fn format_expiry_time(time: DateTime<Utc>) -> String {
    time.format("%A, %B %-d, %Y %-I:%M %p").to_string()
}
