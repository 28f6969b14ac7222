use super::*;

use std::collections::BTreeMap;

/// An in-memory collection of ban records, supporting lookup of the bans
/// that apply to a connecting client.
///
/// Mutation goes through `&mut self`, so a repository shared between
/// connection handlers needs to sit behind a lock held by its owner.
#[derive(Debug, Clone)]
pub struct BanRepository {
    bans: BTreeMap<BanId, BanRecord>,
    next_id: LocalId,
}

impl BanRepository {
    pub fn new() -> Self {
        Self {
            bans: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Build a repository from a set of existing records. Records without an
    /// ID are given one; two records sharing an ID are an error.
    pub fn from_ban_set(bans: Vec<BanRecord>) -> LookupResult<Self> {
        let mut ret = Self::new();
        for id in bans.iter().filter_map(|ban| ban.id()) {
            ret.next_id = ret.next_id.max(id_after(id)?);
        }

        for ban in bans {
            ret.add(ban)?;
        }
        Ok(ret)
    }

    /// Store a new record, assigning it an ID if it doesn't already have one.
    /// Stored records are never replaced, so a record whose ID is already
    /// present is rejected.
    pub fn add(&mut self, mut ban: BanRecord) -> LookupResult<BanId> {
        let id = match ban.id() {
            Some(id) => {
                if self.bans.contains_key(&id) {
                    return Err(LookupError::DuplicateBan(id));
                }
                self.next_id = self.next_id.max(id_after(id)?);
                id
            }
            None => {
                let id = BanId::new(self.next_id);
                self.next_id = id_after(id)?;
                ban.assign_id(id);
                id
            }
        };

        tracing::debug!(?id, "Storing ban");
        self.bans.insert(id, ban);
        Ok(id)
    }

    pub fn get(&self, id: &BanId) -> Option<&BanRecord> {
        self.bans.get(id)
    }

    /// Iterate over every stored record, including expired and reversed ones
    pub fn iter(&self) -> impl Iterator<Item = &BanRecord> {
        self.bans.values()
    }

    pub fn len(&self) -> usize {
        self.bans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bans.is_empty()
    }

    /// Lift a ban by linking an unban record to it
    pub fn attach_unban(&mut self, id: BanId, unban: UnbanRecord) -> LookupResult<()> {
        let ban = self.bans.get_mut(&id).ok_or(LookupError::NoSuchBan(id))?;
        let admin = unban.unbanning_admin;
        ban.attach_unban(unban)?;

        tracing::info!(?id, ?admin, "Ban reversed");
        Ok(())
    }

    /// Correct the severity of a stored ban
    pub fn set_severity(&mut self, id: BanId, severity: Severity) -> LookupResult<()> {
        let ban = self.bans.get_mut(&id).ok_or(LookupError::NoSuchBan(id))?;
        let previous = ban.severity();
        ban.set_severity(severity);

        tracing::info!(?id, %previous, %severity, "Ban severity changed");
        Ok(())
    }

    /// Find every ban that is in force at `now` and matches the candidate, in
    /// ID order.
    pub fn find_enforceable<'a>(
        &'a self,
        candidate: &'a CandidateIdentity,
        now: DateTime<Utc>,
    ) -> impl Iterator<Item = &'a BanRecord> + 'a {
        self.bans
            .values()
            .filter(move |ban| ban.is_enforceable_at(now))
            .filter(move |ban| {
                let matched = matched_criteria(ban, candidate);
                if matched.is_empty() {
                    false
                } else {
                    tracing::debug!(id = ?ban.id(), ?matched, "Ban matched connecting client");
                    true
                }
            })
    }

    /// Find the first ban that is in force at `now` and matches the candidate
    pub fn find_first_enforceable(
        &self,
        candidate: &CandidateIdentity,
        now: DateTime<Utc>,
    ) -> Option<&BanRecord> {
        StandardBanMatcher::new().find_enforceable(self.bans.values(), candidate, now)
    }
}

fn id_after(id: BanId) -> LookupResult<LocalId> {
    id.local().checked_add(1).ok_or(LookupError::IdsExhausted(id))
}

impl Default for BanRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl serde::ser::Serialize for BanRepository {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_seq(self.bans.values())
    }
}

impl<'de> serde::de::Deserialize<'de> for BanRepository {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error;

        let bans = Vec::deserialize(deserializer)?;
        Self::from_ban_set(bans).map_err(D::Error::custom)
    }
}
