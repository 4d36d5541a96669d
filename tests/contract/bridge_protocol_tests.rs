//! Contract tests pinning the NDJSON shapes exchanged with the host.

use serde_json::json;

use playerdb_relay::host::{HostAction, HostEvent};
use playerdb_relay::models::session::{SessionRecord, SessionRef};

#[test]
fn session_joined_shape() {
    let raw = json!({
        "event": "session_joined",
        "session": 3,
        "callsign": "Alice",
        "bzid": "1001",
        "ipaddress": "10.0.0.7",
        "build": "2.4.26",
        "verified": true,
        "permissions": ["playerlookup"]
    });

    let event: HostEvent = serde_json::from_value(raw).expect("valid event");
    assert_eq!(
        event,
        HostEvent::SessionJoined(SessionRecord {
            session: SessionRef(3),
            callsign: "Alice".into(),
            bzid: "1001".into(),
            ipaddress: "10.0.0.7".into(),
            build: "2.4.26".into(),
            verified: true,
            permissions: vec!["playerlookup".into()],
        })
    );
}

#[test]
fn session_joined_defaults_verification_and_permissions() {
    let raw = json!({
        "event": "session_joined",
        "session": 1,
        "callsign": "Guest",
        "bzid": "",
        "ipaddress": "10.0.0.9",
        "build": "2.4.26"
    });

    let HostEvent::SessionJoined(record) = serde_json::from_value(raw).expect("valid event") else {
        panic!("expected session_joined");
    };
    assert!(!record.verified);
    assert!(record.permissions.is_empty());
}

#[test]
fn session_joined_requires_identity_fields() {
    let raw = json!({ "event": "session_joined", "session": 1, "callsign": "Alice" });
    assert!(serde_json::from_value::<HostEvent>(raw).is_err());
}

#[test]
fn session_left_shape() {
    let event: HostEvent =
        serde_json::from_value(json!({ "event": "session_left", "session": 12 })).unwrap();
    assert_eq!(
        event,
        HostEvent::SessionLeft {
            session: SessionRef(12)
        }
    );
}

#[test]
fn command_argument_defaults_to_empty() {
    let event: HostEvent = serde_json::from_value(json!({
        "event": "command",
        "session": 2,
        "name": "lookup"
    }))
    .unwrap();
    assert_eq!(
        event,
        HostEvent::Command {
            session: SessionRef(2),
            name: "lookup".into(),
            argument: String::new(),
        }
    );
}

#[test]
fn unknown_event_tag_is_rejected() {
    let raw = json!({ "event": "player_spawned", "session": 2 });
    assert!(serde_json::from_value::<HostEvent>(raw).is_err());
}

#[test]
fn private_message_shape() {
    let action = HostAction::PrivateMessage {
        session: SessionRef(4),
        text: "Hello Bob".into(),
    };
    assert_eq!(
        serde_json::to_value(&action).unwrap(),
        json!({ "action": "private_message", "session": 4, "text": "Hello Bob" })
    );
}

#[test]
fn admin_broadcast_shape() {
    let action = HostAction::AdminBroadcast {
        text: "ERROR: not found".into(),
    };
    assert_eq!(
        serde_json::to_value(&action).unwrap(),
        json!({ "action": "admin_broadcast", "text": "ERROR: not found" })
    );
}
