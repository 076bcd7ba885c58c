// Unit tests for PresenceProfile and per-tick activity building

use crate::config::DisplayConfig;
use crate::metrics::MetricsSample;
use crate::scheduler::PresenceProfile;
use crate::snapshot::SystemSnapshot;

use std::time::{Duration, UNIX_EPOCH};

use url::Url;

const SNAPSHOT: &str = "me@box\n---\nOS: Arch Linux x86_64\nKernel: Linux 6.9\nDE: GNOME 46\nGPU: AMD Radeon 780M\n";

fn busy_sample() -> MetricsSample {
    MetricsSample {
        cpu_percent: 13.4,
        memory_percent: 20.0,
        rx_bytes_per_sec: 1536.0,
        tx_bytes_per_sec: 200.0,
    }
}

/// **VALUE**: Verifies the activity text formats for state and small text.
///
/// **WHY THIS MATTERS**: These strings are what users actually see; rounding
/// and unit suffixes are part of the contract.
///
/// **BUG THIS CATCHES**: Would catch raw byte counts or unrounded percentages.
#[test]
fn given_snapshot_profile_when_activity_then_text_fields_formatted() {
    // GIVEN: A profile built from a snapshot
    let snapshot = SystemSnapshot::parse(SNAPSHOT);
    let profile = PresenceProfile::from_snapshot(&snapshot, &DisplayConfig::default());
    let started_at = UNIX_EPOCH + Duration::from_secs(1_700_000_000);

    // WHEN: Building an activity
    let activity = profile.activity(&busy_sample(), started_at).unwrap();

    // THEN: Static details, rounded state, humanized throughput
    assert_eq!(activity.details, "OS: Arch Linux x86_64\nKernel: Linux 6.9");
    assert_eq!(activity.state, "CPU 13% • RAM 20%");
    assert_eq!(
        activity.small_text.as_deref(),
        Some("20% RAM • ↓ 1.5 KiB/s ↑ 200 B/s")
    );
    assert_eq!(activity.large_image.as_deref(), Some("arch"));
    assert_eq!(activity.large_text.as_deref(), Some("GNOME 46"));
    assert_eq!(activity.small_image.as_deref(), Some("dot"));
    assert_eq!(
        activity.timestamps.and_then(|t| t.start),
        Some(started_at)
    );
    assert!(activity.buttons.is_empty());
}

#[test]
fn given_no_snapshot_when_activity_then_details_fall_back_to_live_summary() {
    let profile = PresenceProfile::new(&DisplayConfig::default());

    let activity = profile.activity(&busy_sample(), UNIX_EPOCH).unwrap();

    assert_eq!(activity.details, "13% CPU • 20% RAM • ↓ 1.5 KiB/s ↑ 200 B/s");
    assert_eq!(activity.large_image.as_deref(), Some("default_os"));
}

#[test]
fn given_paste_url_when_activity_then_single_button_links_it() {
    let url = Url::parse("https://paste.rs/AbC").unwrap();
    let profile = PresenceProfile::new(&DisplayConfig::default()).with_paste_url(&url);

    let activity = profile.activity(&busy_sample(), UNIX_EPOCH).unwrap();

    assert_eq!(activity.buttons.len(), 1);
    assert_eq!(activity.buttons[0].label, "Full system info");
    assert_eq!(activity.buttons[0].url, "https://paste.rs/AbC");
}

#[test]
fn given_snapshot_without_de_when_from_snapshot_then_large_text_is_user_host() {
    let snapshot = SystemSnapshot::parse("me@box\nOS: Debian 12\n");

    let profile = PresenceProfile::from_snapshot(&snapshot, &DisplayConfig::default());

    assert_eq!(profile.large_text.as_deref(), Some("me@box"));
    assert_eq!(profile.large_image, "default_os");
}
