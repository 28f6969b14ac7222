use super::*;
use bitflags::bitflags;

/// The identity presented by a connecting client, used when looking up bans.
///
/// Any of the fields may be missing, depending on how far through the
/// connection process the client has got.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CandidateIdentity {
    account_id: Option<AccountId>,
    source_address: Option<IpAddr>,
    hardware_id: Option<HardwareId>,
}

impl CandidateIdentity {
    pub fn new(
        account_id: Option<AccountId>,
        source_address: Option<IpAddr>,
        hardware_id: Option<HardwareId>,
    ) -> Self {
        Self {
            account_id,
            source_address: source_address.map(canonical_address),
            hardware_id,
        }
    }

    /// Construct a `CandidateIdentity` containing only an IP address, for
    /// checking before the client has identified itself.
    pub fn from_address(address: IpAddr) -> Self {
        Self::new(None, Some(address), None)
    }

    /// Return a `CandidateIdentity` with the given account, and all other fields taken from `self`
    pub fn with_account(self, account_id: AccountId) -> Self {
        Self {
            account_id: Some(account_id),
            ..self
        }
    }

    /// Return a `CandidateIdentity` with the given source address, and all
    /// other fields taken from `self`
    pub fn with_address(self, address: IpAddr) -> Self {
        Self {
            source_address: Some(canonical_address(address)),
            ..self
        }
    }

    /// Return a `CandidateIdentity` with the given hardware ID, and all other
    /// fields taken from `self`
    pub fn with_hardware_id(self, hardware_id: HardwareId) -> Self {
        Self {
            hardware_id: Some(hardware_id),
            ..self
        }
    }

    pub fn account_id(&self) -> Option<&AccountId> {
        self.account_id.as_ref()
    }

    /// The client's address, with IPv4-mapped IPv6 addresses folded to IPv4
    pub fn source_address(&self) -> Option<&IpAddr> {
        self.source_address.as_ref()
    }

    pub fn hardware_id(&self) -> Option<&HardwareId> {
        self.hardware_id.as_ref()
    }
}

bitflags! {
    /// Which of a ban's criteria matched a candidate
    pub struct MatchedCriteria : u8
    {
        const ACCOUNT = 0x01;
        const ADDRESS = 0x02;
        const HARDWARE = 0x04;
    }
}

/// Work out which of the record's populated criteria match the candidate.
///
/// Criteria the record doesn't have, or that the candidate didn't supply,
/// never match.
pub fn matched_criteria(record: &BanRecord, candidate: &CandidateIdentity) -> MatchedCriteria {
    let mut matched = MatchedCriteria::empty();

    if let (Some(banned), Some(account)) = (record.account_id(), candidate.account_id()) {
        matched.set(MatchedCriteria::ACCOUNT, banned == account);
    }
    if let (Some(network), Some(address)) = (record.address(), candidate.source_address()) {
        matched.set(MatchedCriteria::ADDRESS, network.contains(address));
    }
    if let (Some(banned), Some(hwid)) = (record.hardware_id(), candidate.hardware_id()) {
        matched.set(MatchedCriteria::HARDWARE, banned.as_bytes() == hwid.as_bytes());
    }

    matched
}

/// Determine whether any criterion on the record matches the candidate.
///
/// This does not consider whether the ban is still in force; see
/// [`classify`] for that.
pub fn matches(record: &BanRecord, candidate: &CandidateIdentity) -> bool {
    !matched_criteria(record, candidate).is_empty()
}

/// A `BanMatcher` contains the policy to match ban records against connecting clients
pub trait BanMatcher {
    /// Determine whether the given candidate is matched by the given record.
    fn record_matches(&self, record: &BanRecord, candidate: &CandidateIdentity) -> bool;

    /// Scan the provided records for one that is currently in force and
    /// matches the given candidate.
    fn find_enforceable<'a, I>(
        &self,
        records: I,
        candidate: &CandidateIdentity,
        now: DateTime<Utc>,
    ) -> Option<&'a BanRecord>
    where
        I: IntoIterator<Item = &'a BanRecord>,
    {
        records
            .into_iter()
            .filter(|record| classify(record, now).is_enforceable())
            .find(|record| self.record_matches(record, candidate))
    }
}

/// Default implementation of the [`BanMatcher`] trait
pub struct StandardBanMatcher {}

impl StandardBanMatcher {
    pub fn new() -> Self {
        Self {}
    }
}

impl Default for StandardBanMatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl BanMatcher for StandardBanMatcher {
    fn record_matches(&self, record: &BanRecord, candidate: &CandidateIdentity) -> bool {
        matches(record, candidate)
    }
}
