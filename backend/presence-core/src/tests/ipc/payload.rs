// Unit tests for handshake/command documents and reply inspection

use crate::activity::map_activity;
use crate::error::ipc::IpcError;
use crate::ipc::payload::{Command, Handshake, check_command_response, new_nonce};

use models::ActivityBuilder;

use serde_json::json;
use uuid::Uuid;

#[test]
fn given_client_id_when_serialize_handshake_then_matches_wire_shape() {
    let value = serde_json::to_value(Handshake::new("1234567890")).unwrap();

    assert_eq!(value, json!({ "v": 1, "client_id": "1234567890" }));
}

/// **VALUE**: Verifies the command document has exactly the fields the remote expects.
///
/// **WHY THIS MATTERS**: A misnamed `cmd` or a missing `nonce` is ignored by the
/// presence application without any error reply.
///
/// **BUG THIS CATCHES**: Would catch serde renames drifting from the wire names.
#[test]
fn given_activity_when_build_set_activity_command_then_wire_shape_is_correct() {
    // GIVEN: A minimal activity
    let activity = ActivityBuilder::default()
        .with_details("Editing")
        .with_state("main.rs")
        .build()
        .unwrap();

    // WHEN: Wrapping it in a command
    let command = Command::set_activity(4242, map_activity(&activity));
    let value = serde_json::to_value(&command).unwrap();

    // THEN: cmd, args.pid, args.activity and nonce are present
    assert_eq!(value["cmd"], "SET_ACTIVITY");
    assert_eq!(value["args"]["pid"], 4242);
    assert_eq!(
        value["args"]["activity"],
        json!({ "details": "Editing", "state": "main.rs" })
    );
    assert!(value["nonce"].is_string());
}

/// **VALUE**: Verifies nonces are fresh random RFC 4122 identifiers.
///
/// **WHY THIS MATTERS**: The remote side correlates replies by nonce; a reused
/// nonce can pair a reply with the wrong request.
///
/// **BUG THIS CATCHES**: Would catch a constant or counter-based nonce.
#[test]
fn given_two_commands_when_generated_then_nonces_are_distinct_v4_uuids() {
    // WHEN: Generating two nonces
    let first = new_nonce();
    let second = new_nonce();

    // THEN: Both parse as version 4 and differ
    assert_ne!(first, second);
    for nonce in [&first, &second] {
        let parsed = Uuid::parse_str(nonce).expect("nonce should be a UUID");
        assert_eq!(parsed.get_version_num(), 4);
    }
}

/// **VALUE**: Verifies an ERROR event reply becomes a Rejected error with its code.
///
/// **WHY THIS MATTERS**: A rejected activity will be rejected again after a
/// reconnect, so it must not look like an I/O failure.
///
/// **BUG THIS CATCHES**: Would catch treating every reply as success.
#[test]
fn given_error_event_when_check_command_response_then_returns_rejected() {
    // GIVEN: An ERROR reply
    let reply = br#"{"cmd":"SET_ACTIVITY","evt":"ERROR","data":{"code":4000,"message":"child \"activity\" fails"}}"#;

    // WHEN: Inspecting it
    let result = check_command_response(reply);

    // THEN: Rejected with the code and message
    match result {
        Err(IpcError::Rejected { code, message, .. }) => {
            assert_eq!(code, 4000);
            assert!(message.contains("activity"));
        }
        other => panic!("Expected Rejected, got {other:?}"),
    }
}

#[test]
fn given_non_error_or_non_json_reply_when_check_command_response_then_ok() {
    assert!(check_command_response(br#"{"cmd":"SET_ACTIVITY","evt":null}"#).is_ok());
    assert!(check_command_response(b"").is_ok());
    assert!(check_command_response(b"not json").is_ok());
}
