use super::fixtures::*;
use crate::prelude::*;

use pretty_assertions::assert_eq;

#[test]
fn dual_stack_permanent_address_ban() {
    let ban = BanRecord::builder(t0())
        .address(ip("::ffff:203.0.113.5"), 128)
        .reason("ban evasion")
        .build()
        .unwrap();

    assert_eq!(
        ban.address(),
        Some(&AddressCriterion::normalize(ip("203.0.113.5"), 32).unwrap())
    );
    assert_eq!(classify(&ban, t0() + chrono::Duration::days(365)), BanState::Permanent);
    assert!(matches(&ban, &CandidateIdentity::from_address(ip("203.0.113.5"))));
    assert!(matches(&ban, &CandidateIdentity::from_address(ip("::ffff:203.0.113.5"))));
    assert!(!matches(&ban, &CandidateIdentity::from_address(ip("203.0.113.6"))));
}

#[test]
fn one_hour_ban_lifecycle() {
    let ban = BanRecord::builder(t0())
        .account(account(1))
        .expires_at(t0() + chrono::Duration::hours(1))
        .build()
        .unwrap();

    assert_eq!(classify(&ban, t0() + chrono::Duration::minutes(30)), BanState::Active);
    assert_eq!(classify(&ban, t0() + chrono::Duration::hours(2)), BanState::Expired);
}

#[test]
fn connection_check_against_a_repository() {
    init_tracing();

    let mut repo = BanRepository::new();
    let range_ban = repo.add(
        BanRecord::builder(t0())
            .address(ip("198.51.100.0"), 24)
            .expires_at(t0() + chrono::Duration::days(7))
            .reason("proxy range")
            .build()
            .unwrap(),
    )
    .unwrap();
    let hwid_ban = repo.add(
        BanRecord::builder(t0())
            .hardware_id(hwid(&[0xde, 0xad, 0xbe, 0xef]))
            .reason("alt accounts")
            .build()
            .unwrap(),
    )
    .unwrap();

    let now = t0() + chrono::Duration::days(1);

    // Early check, before the client has identified itself
    let early = CandidateIdentity::from_address(ip("::ffff:198.51.100.20"));
    assert_eq!(
        repo.find_first_enforceable(&early, now).and_then(|b| b.id()),
        Some(range_ban)
    );

    // Full check from a clean address with a banned hardware ID
    let full = CandidateIdentity::from_address(ip("192.0.2.1"))
        .with_account(account(7))
        .with_hardware_id(hwid(&[0xde, 0xad, 0xbe, 0xef]));
    assert_eq!(
        repo.find_first_enforceable(&full, now).and_then(|b| b.id()),
        Some(hwid_ban)
    );

    // The range ban runs out, and the hardware ban is lifted
    repo.attach_unban(hwid_ban, UnbanRecord::new(now, Some(account(100))))
        .unwrap();
    let later = t0() + chrono::Duration::days(8);
    assert_eq!(repo.find_enforceable(&early, later).count(), 0);
    assert_eq!(repo.find_enforceable(&full, later).count(), 0);

    // Both records are kept for audit
    assert_eq!(repo.len(), 2);
    assert_eq!(
        repo.get(&hwid_ban).map(|b| b.state_at(later)),
        Some(BanState::Reversed)
    );
    assert_eq!(
        repo.get(&range_ban).map(|b| b.state_at(later)),
        Some(BanState::Expired)
    );
}
