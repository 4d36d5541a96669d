//! Unit tests for the `lookup` command and join-event intake.

use playerdb_relay::host::commands::lookup_request;
use playerdb_relay::host::directory::SessionDirectory;
use playerdb_relay::host::events::join_request;
use playerdb_relay::models::request::RequestKind;
use playerdb_relay::models::session::{IdentityToken, SessionRecord, SessionRef};
use playerdb_relay::CommandRejection;

const PERMISSION: &str = "playerlookup";

fn record(session: u32, permissions: &[&str]) -> SessionRecord {
    SessionRecord {
        session: SessionRef(session),
        callsign: "Alice".to_owned(),
        bzid: "42".to_owned(),
        ipaddress: "1.2.3.4".to_owned(),
        build: "v1".to_owned(),
        verified: true,
        permissions: permissions.iter().map(|p| (*p).to_owned()).collect(),
    }
}

fn directory_with(record: SessionRecord) -> SessionDirectory {
    let mut dir = SessionDirectory::new();
    dir.insert(record);
    dir
}

#[test]
fn permitted_lookup_produces_query() {
    let dir = directory_with(record(2, &[PERMISSION]));

    let request = lookup_request(&dir, PERMISSION, SessionRef(2), "Bob").expect("accepted");

    assert_eq!(request.kind, RequestKind::Query);
    assert_eq!(request.fields.get("query"), Some("Bob"));
    assert_eq!(request.fields.len(), 1);
    let requester = request.requester.expect("requester captured");
    assert_eq!(requester.session, SessionRef(2));
    assert_eq!(requester.token, IdentityToken::new("42"));
}

#[test]
fn missing_permission_is_rejected() {
    let dir = directory_with(record(2, &["other"]));

    let err = lookup_request(&dir, PERMISSION, SessionRef(2), "Bob").unwrap_err();

    assert_eq!(err, CommandRejection::PermissionDenied);
    assert_eq!(
        err.notice(),
        "You do not have permission to run the lookup command"
    );
}

#[test]
fn unknown_session_is_rejected_as_unpermitted() {
    let dir = SessionDirectory::new();

    let err = lookup_request(&dir, PERMISSION, SessionRef(9), "Bob").unwrap_err();

    assert_eq!(err, CommandRejection::PermissionDenied);
}

#[test]
fn search_term_is_sent_verbatim() {
    let dir = directory_with(record(2, &[PERMISSION]));

    let request =
        lookup_request(&dir, PERMISSION, SessionRef(2), " Bob the  Builder ").expect("accepted");

    assert_eq!(request.fields.get("query"), Some(" Bob the  Builder "));
}

#[test]
fn blank_argument_is_rejected_with_usage() {
    let dir = directory_with(record(2, &[PERMISSION]));

    let err = lookup_request(&dir, PERMISSION, SessionRef(2), "   ").unwrap_err();

    assert_eq!(err, CommandRejection::EmptyArgument);
    assert_eq!(err.notice(), "Usage : /lookup <callsign>|<ipaddress>");
}

#[test]
fn permission_is_checked_before_argument() {
    let dir = directory_with(record(2, &[]));

    let err = lookup_request(&dir, PERMISSION, SessionRef(2), "").unwrap_err();

    assert_eq!(err, CommandRejection::PermissionDenied);
}

#[test]
fn join_event_becomes_unaddressed_join_request() {
    let request = join_request(&record(2, &[]));

    assert_eq!(request.kind, RequestKind::Join);
    assert!(request.requester.is_none());
    let fields: Vec<(&str, &str)> = request.fields.iter().collect();
    assert_eq!(
        fields,
        [
            ("callsign", "Alice"),
            ("bzid", "42"),
            ("ipaddress", "1.2.3.4"),
            ("build", "v1"),
        ]
    );
}
