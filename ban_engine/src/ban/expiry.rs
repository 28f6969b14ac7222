use super::*;

/// Whether a ban is currently in force. This is computed from the record
/// and the current time; it is never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum BanState {
    /// The ban has no expiry time
    Permanent,
    /// The ban has an expiry time that hasn't yet been reached
    Active,
    /// The ban's expiry time has passed
    Expired,
    /// The ban was lifted by an admin
    Reversed,
}

impl BanState {
    /// Whether a ban in this state should block a connection
    pub fn is_enforceable(self) -> bool {
        matches!(self, Self::Permanent | Self::Active)
    }
}

/// Classify a ban at the given time. A linked unban takes precedence over
/// the ban's expiry time.
pub fn classify(record: &BanRecord, now: DateTime<Utc>) -> BanState {
    if record.unban().is_some() {
        return BanState::Reversed;
    }

    match record.expires_at() {
        None => BanState::Permanent,
        Some(expires) if now < expires => BanState::Active,
        Some(_) => BanState::Expired,
    }
}

impl BanRecord {
    /// The state of this ban at the given time
    pub fn state_at(&self, now: DateTime<Utc>) -> BanState {
        classify(self, now)
    }

    /// Whether this ban should block matching connections at the given time
    pub fn is_enforceable_at(&self, now: DateTime<Utc>) -> bool {
        classify(self, now).is_enforceable()
    }
}
