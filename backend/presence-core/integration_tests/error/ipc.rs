use presence_core::error::{CoreError, IpcError};

use std::error::Error;
use std::io::{Error as IoError, ErrorKind};

/// **VALUE**: Verifies `IpcError::Write` carries the opcode and the capture location.
///
/// **WHY THIS MATTERS**: Write failures trigger the reconnect path; the log line
/// is the only record of which frame failed and where.
///
/// **BUG THIS CATCHES**: Would catch if someone:
/// - Removes `#[track_caller]` from `IpcError::write`
/// - Drops the opcode from the Display format
/// - Logs raw payload bytes instead of the opcode
#[test]
fn given_write_error_when_formatted_then_includes_opcode_and_location() {
    // GIVEN: A broken pipe while writing a command frame
    let io_err = IoError::new(ErrorKind::BrokenPipe, "broken pipe");

    // WHEN: Wrapping and formatting
    let err = IpcError::write(1, &io_err);
    let error_string = format!("{}", err);

    // THEN: Kind, opcode and file location are present
    assert!(error_string.contains("Write Error"));
    assert!(error_string.contains("opcode 1"));
    assert!(error_string.contains("ipc.rs"));
    assert_eq!(err.opcode(), Some(1));
    assert!(err.is_io());
}

/// **VALUE**: Verifies CoreError wraps IpcError transparently.
///
/// **WHY THIS MATTERS**: The executable reports CoreError; wrapping must not add
/// noise or hide the original message.
///
/// **BUG THIS CATCHES**: Would catch replacing `#[error(transparent)]` with a
/// custom prefix.
#[test]
fn given_ipc_error_when_converted_to_core_error_then_display_is_unchanged() {
    // GIVEN: A rejected command
    let ipc = IpcError::rejected(4000, "invalid activity");
    let expected = ipc.to_string();

    // WHEN: Converting
    let core: CoreError = ipc.into();

    // THEN: Same text
    assert_eq!(core.to_string(), expected);
}

#[test]
fn given_handshake_error_when_walking_sources_then_reaches_connect_error() {
    let connect = IpcError::connect(
        "/run/user/1000/discord-ipc-0",
        &IoError::new(ErrorKind::NotFound, "no such file"),
    );
    let handshake = IpcError::handshake(connect);

    let source = handshake.source().expect("handshake should have a source");

    assert!(source.to_string().contains("/run/user/1000/discord-ipc-0"));
}
