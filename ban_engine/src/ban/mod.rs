use crate::{address::*, errors::*, id::*};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{net::IpAddr, time::Duration};
use strum::{EnumIter, EnumString};

mod matching;
pub use matching::*;

mod expiry;
pub use expiry::*;

mod repository;
pub use repository::*;


/// How serious an offence the ban was issued for. Ordered from least to most
/// severe.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Default,
    EnumString,
    EnumIter,
    strum::Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Minor,
    #[default]
    Moderate,
    High,
}

/// A later reversal of a ban
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnbanRecord {
    pub id: Option<UnbanId>,
    pub unbanned_at: DateTime<Utc>,
    pub unbanning_admin: Option<AccountId>,
    pub reason: Option<String>,
}

impl UnbanRecord {
    pub fn new(unbanned_at: DateTime<Utc>, unbanning_admin: Option<AccountId>) -> Self {
        Self {
            id: None,
            unbanned_at,
            unbanning_admin,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// A server ban.
///
/// Each of the account, address and hardware criteria is optional, but at
/// least one is always present. Records are never deleted; once expired or
/// reversed they stay around for audit purposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BanRecordFields")]
pub struct BanRecord {
    id: Option<BanId>,
    account_id: Option<AccountId>,
    address: Option<AddressCriterion>,
    hardware_id: Option<HardwareId>,

    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    round_id: Option<i32>,
    playtime_at_creation: Duration,

    reason: String,
    severity: Severity,
    issuing_admin: Option<AccountId>,
    unban: Option<UnbanRecord>,
}

/// Unvalidated shape of a [`BanRecord`], used so that deserialized records
/// go through the same checks as newly built ones
#[derive(Deserialize)]
struct BanRecordFields {
    id: Option<BanId>,
    account_id: Option<AccountId>,
    address: Option<AddressCriterion>,
    hardware_id: Option<HardwareId>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    round_id: Option<i32>,
    playtime_at_creation: Duration,
    reason: String,
    severity: Severity,
    issuing_admin: Option<AccountId>,
    unban: Option<UnbanRecord>,
}

impl TryFrom<BanRecordFields> for BanRecord {
    type Error = BanError;

    fn try_from(fields: BanRecordFields) -> BanResult<Self> {
        check_target(&fields.account_id, &fields.address, &fields.hardware_id)?;

        Ok(Self {
            id: fields.id,
            account_id: fields.account_id,
            address: fields.address,
            hardware_id: fields.hardware_id,
            created_at: fields.created_at,
            expires_at: fields.expires_at,
            round_id: fields.round_id,
            playtime_at_creation: fields.playtime_at_creation,
            reason: fields.reason,
            severity: fields.severity,
            issuing_admin: fields.issuing_admin,
            unban: fields.unban,
        })
    }
}

fn check_target<A>(
    account_id: &Option<AccountId>,
    address: &Option<A>,
    hardware_id: &Option<HardwareId>,
) -> BanResult<()> {
    if account_id.is_none() && address.is_none() && hardware_id.is_none() {
        Err(BanError::InvalidBanTarget)
    } else {
        Ok(())
    }
}

impl BanRecord {
    /// Begin building a new ban created at the given time
    pub fn builder(created_at: DateTime<Utc>) -> BanRecordBuilder {
        BanRecordBuilder::new(created_at)
    }

    pub fn id(&self) -> Option<BanId> {
        self.id
    }

    /// The banned account, if the ban is keyed on one
    pub fn account_id(&self) -> Option<&AccountId> {
        self.account_id.as_ref()
    }

    /// The banned network, already normalized
    pub fn address(&self) -> Option<&AddressCriterion> {
        self.address.as_ref()
    }

    /// The banned hardware fingerprint
    pub fn hardware_id(&self) -> Option<&HardwareId> {
        self.hardware_id.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the ban expires, or `None` for a permanent ban
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// The length of a temporary ban, measured from its creation
    pub fn duration(&self) -> Option<chrono::Duration> {
        self.expires_at.map(|expires| expires - self.created_at)
    }

    pub fn round_id(&self) -> Option<i32> {
        self.round_id
    }

    /// How much time the banned player had played when the ban was issued
    pub fn playtime_at_creation(&self) -> Duration {
        self.playtime_at_creation
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn severity(&self) -> Severity {
        self.severity
    }

    /// The admin who issued the ban, or `None` for a system-issued ban
    pub fn issuing_admin(&self) -> Option<&AccountId> {
        self.issuing_admin.as_ref()
    }

    /// The reversal of this ban, if it has been lifted
    pub fn unban(&self) -> Option<&UnbanRecord> {
        self.unban.as_ref()
    }

    /// Change the recorded severity. Nothing else about the record changes.
    pub fn set_severity(&mut self, severity: Severity) {
        self.severity = severity;
    }

    /// Link an unban to this record. A record can only be reversed once; a
    /// second attempt fails and leaves the existing unban in place.
    pub fn attach_unban(&mut self, unban: UnbanRecord) -> BanResult<()> {
        if self.unban.is_some() {
            return Err(BanError::AlreadyUnbanned(self.id));
        }
        self.unban = Some(unban);
        Ok(())
    }

    pub(crate) fn assign_id(&mut self, id: BanId) {
        self.id = Some(id);
    }
}

/// Collects the fields of a new [`BanRecord`]. Call [`build`](Self::build) to
/// validate and produce the record.
#[derive(Debug, Clone)]
pub struct BanRecordBuilder {
    id: Option<BanId>,
    account_id: Option<AccountId>,
    address: Option<(IpAddr, u8)>,
    hardware_id: Option<HardwareId>,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
    round_id: Option<i32>,
    playtime_at_creation: Duration,
    reason: String,
    severity: Severity,
    issuing_admin: Option<AccountId>,
    unban: Option<UnbanRecord>,
}

impl BanRecordBuilder {
    pub fn new(created_at: DateTime<Utc>) -> Self {
        Self {
            id: None,
            account_id: None,
            address: None,
            hardware_id: None,
            created_at,
            expires_at: None,
            round_id: None,
            playtime_at_creation: Duration::ZERO,
            reason: String::new(),
            severity: Severity::default(),
            issuing_admin: None,
            unban: None,
        }
    }

    pub fn id(mut self, id: BanId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    /// Ban a network, given as an address and CIDR prefix length. The pair is
    /// normalized when the record is built.
    pub fn address(mut self, address: IpAddr, prefix_len: u8) -> Self {
        self.address = Some((address, prefix_len));
        self
    }

    pub fn hardware_id(mut self, hardware_id: HardwareId) -> Self {
        self.hardware_id = Some(hardware_id);
        self
    }

    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn round(mut self, round_id: i32) -> Self {
        self.round_id = Some(round_id);
        self
    }

    pub fn playtime(mut self, playtime: Duration) -> Self {
        self.playtime_at_creation = playtime;
        self
    }

    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = reason.into();
        self
    }

    pub fn severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    pub fn issued_by(mut self, admin: AccountId) -> Self {
        self.issuing_admin = Some(admin);
        self
    }

    pub fn unban(mut self, unban: UnbanRecord) -> Self {
        self.unban = Some(unban);
        self
    }

    /// Validate the collected fields and produce the record.
    ///
    /// Fails with [`BanError::InvalidBanTarget`] if no account, address or
    /// hardware ID was given, and with [`BanError::InvalidPrefix`] if the
    /// address prefix doesn't fit the address family.
    pub fn build(self) -> BanResult<BanRecord> {
        check_target(&self.account_id, &self.address, &self.hardware_id)?;

        let address = self
            .address
            .map(|(address, prefix_len)| AddressCriterion::normalize(address, prefix_len))
            .transpose()?;

        Ok(BanRecord {
            id: self.id,
            account_id: self.account_id,
            address,
            hardware_id: self.hardware_id,
            created_at: self.created_at,
            expires_at: self.expires_at,
            round_id: self.round_id,
            playtime_at_creation: self.playtime_at_creation,
            reason: self.reason,
            severity: self.severity,
            issuing_admin: self.issuing_admin,
            unban: self.unban,
        })
    }
}
