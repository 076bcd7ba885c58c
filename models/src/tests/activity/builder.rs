use crate::{ActivityBuilder, Button, ModelError, Party, Timestamps};

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// **VALUE**: Verifies that the builder refuses more buttons than the remote side renders.
///
/// **WHY THIS MATTERS**: The presence application silently drops extra buttons or
/// rejects the whole command. Catching it at construction keeps the failure local.
///
/// **BUG THIS CATCHES**: Would catch if the `MAX_BUTTONS` check is removed or off by one.
#[test]
fn given_three_buttons_when_building_activity_then_returns_validation_error() {
    // GIVEN: Builder with one button too many
    let builder = ActivityBuilder::default()
        .with_details("OS: Arch Linux")
        .with_button(Button::new("One", "https://example.com/1"))
        .with_button(Button::new("Two", "https://example.com/2"))
        .with_button(Button::new("Three", "https://example.com/3"));

    // WHEN: Attempting to build
    let result = builder.build();

    // THEN: Should return validation error naming the limit
    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "At most 2 buttons are allowed, got 3");
        }
        Ok(_) => panic!("Expected validation error for three buttons"),
    }
}

#[test]
fn given_button_without_http_scheme_when_building_then_returns_validation_error() {
    let result = ActivityBuilder::default()
        .with_button(Button::new("Paste", "ftp://example.com/x"))
        .build();

    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert!(message.contains("Invalid button URL"));
        }
        Ok(_) => panic!("Expected validation error for ftp URL"),
    }
}

#[test]
fn given_button_with_empty_label_when_building_then_returns_validation_error() {
    let result = ActivityBuilder::default()
        .with_button(Button::new("", "https://example.com"))
        .build();

    assert!(matches!(result, Err(ModelError::Validation { .. })));
}

/// **BUG THIS CATCHES**: A party reporting 5 of 4 players would render nonsense remotely.
#[test]
fn given_party_larger_than_max_when_building_then_returns_validation_error() {
    let result = ActivityBuilder::default()
        .with_party(Party {
            id: String::from("lobby"),
            current_size: 5,
            max_size: 4,
        })
        .build();

    match result {
        Err(ModelError::Validation { message, .. }) => {
            assert_eq!(message, "Party size 5 exceeds maximum 4");
        }
        Ok(_) => panic!("Expected validation error for oversized party"),
    }
}

#[test]
fn given_all_fields_when_building_then_activity_carries_them() {
    // GIVEN: A fully populated builder
    let start = UNIX_EPOCH + Duration::from_secs(1_700_000_000);

    // WHEN: Building
    let activity = ActivityBuilder::default()
        .with_details("OS: Arch Linux")
        .with_state("CPU 12% • RAM 40%")
        .with_large_image("arch", "GNOME 49.1")
        .with_small_image("dot", "40% RAM")
        .with_start(start)
        .with_button(Button::new("Full system info", "https://paste.rs/abc"))
        .build()
        .expect("valid activity");

    // THEN: Everything lands where expected
    assert_eq!(activity.details, "OS: Arch Linux");
    assert_eq!(activity.state, "CPU 12% • RAM 40%");
    assert_eq!(activity.large_image.as_deref(), Some("arch"));
    assert_eq!(activity.large_text.as_deref(), Some("GNOME 49.1"));
    assert_eq!(activity.small_image.as_deref(), Some("dot"));
    assert_eq!(activity.small_text.as_deref(), Some("40% RAM"));
    assert_eq!(activity.timestamps, Some(Timestamps::started_at(start)));
    assert_eq!(activity.buttons.len(), 1);
    assert!(activity.party.is_none());
    assert!(activity.secrets.is_none());
}

#[test]
fn given_end_without_start_when_building_then_end_is_kept_for_the_mapper_to_drop() {
    let end = SystemTime::now();

    let activity = ActivityBuilder::default()
        .with_end(end)
        .build()
        .expect("valid activity");

    let timestamps = activity.timestamps.expect("timestamps set");
    assert!(timestamps.start.is_none());
    assert_eq!(timestamps.end, Some(end));
}

#[test]
fn given_identical_inputs_when_built_twice_then_activities_compare_equal() {
    let start = UNIX_EPOCH + Duration::from_secs(42);
    let build = || {
        ActivityBuilder::default()
            .with_details("d")
            .with_state("s")
            .with_start(start)
            .build()
            .expect("valid activity")
    };

    assert_eq!(build(), build());
}
