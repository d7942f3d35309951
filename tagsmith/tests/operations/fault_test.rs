use crate::common::fixtures::{blank_mifare, blank_ntag, fixture_catalog, record_named};
use tagsmith::prelude::*;
use tagsmith::transport::mock::MockTag;

#[test]
fn silently_protected_identity_pages() {
    let catalog = fixture_catalog();
    let mario = record_named(&catalog, "Mario").clone();
    let service = TagService::new(catalog);
    let mock = blank_ntag();
    mock.set_page(3, [0; 4]);
    mock.protect(3..=10);
    let outcome = service.write(&MockTag::ntag(mock), &mario);
    let failure = outcome.failure().expect("write should fail");
    assert_eq!(failure.kind, ErrorKind::VerificationMismatch);
    assert!(failure.message.contains("critical pages (3, 4, 5, 6, 7, 8, 9, 10)"));
}

#[test]
fn tag_pulled_away_twice_reports_connection_loss() {
    let catalog = fixture_catalog();
    let spyro = record_named(&catalog, "Spyro").clone();
    let service = TagService::new(catalog);
    let mock = blank_mifare();
    mock.drop_connection_on_write(20, 2);
    let outcome = service.write(&MockTag::mifare(mock.clone()), &spyro);
    let failure = outcome.failure().expect("write should fail");
    assert_eq!(failure.kind, ErrorKind::ConnectionLost);
    assert!(failure.message.contains("keep the tag close"));
    assert!(!mock.is_open());
    // blocks before the drop were written, nothing after
    assert_eq!(mock.write_log().last(), Some(&19));
}

#[test]
fn tag_that_never_connects() {
    let service = TagService::new(fixture_catalog());
    let mock = blank_ntag();
    mock.refuse_connect(true);
    let tag = MockTag::ntag(mock);
    assert_eq!(
        service.erase(&tag, TagFamily::Ntag215).failure().map(|f| f.kind),
        Some(ErrorKind::ConnectionLost)
    );
    assert!(!service.check(&tag, TagFamily::Ntag215).is_compatible());
}

#[test]
fn locked_sector_fails_write_with_authentication_failure() {
    let catalog = fixture_catalog();
    let spyro = record_named(&catalog, "Spyro").clone();
    let service = TagService::new(catalog);
    let mock = blank_mifare();
    mock.lock_sector(9);
    let outcome = service.write(&MockTag::mifare(mock), &spyro);
    assert_eq!(
        outcome.failure().map(|f| f.kind),
        Some(ErrorKind::AuthenticationFailure)
    );
}
