use crate::activity::{
    WireActivity, WireAssets, WireButton, WireParty, WireSecrets, WireTimestamps,
};

use models::{Activity, MAX_BUTTONS, Party, Secrets, Timestamps};

use std::time::{SystemTime, UNIX_EPOCH};

use log::warn;

/// Convert an activity into its wire payload.
///
/// - timestamps become epoch milliseconds; `end` is dropped without `start`
/// - party size becomes `[current, max]`
/// - empty strings count as absent
/// - absent party/secrets/timestamps are omitted, not defaulted
/// - buttons keep input order, capped at [`MAX_BUTTONS`]
///
/// String lengths are not checked.
pub fn map_activity(activity: &Activity) -> WireActivity {
    let assets = WireAssets {
        large_image: activity.large_image.as_deref().and_then(non_empty),
        large_text: activity.large_text.as_deref().and_then(non_empty),
        small_image: activity.small_image.as_deref().and_then(non_empty),
        small_text: activity.small_text.as_deref().and_then(non_empty),
    };

    if activity.buttons.len() > MAX_BUTTONS {
        warn!(
            "Dropping {} buttons beyond the limit of {MAX_BUTTONS}",
            activity.buttons.len() - MAX_BUTTONS
        );
    }

    WireActivity {
        details: non_empty(&activity.details),
        state: non_empty(&activity.state),
        assets: (!assets.is_empty()).then_some(assets),
        timestamps: activity.timestamps.as_ref().and_then(map_timestamps),
        party: activity.party.as_ref().map(map_party),
        secrets: activity.secrets.as_ref().map(map_secrets),
        buttons: activity
            .buttons
            .iter()
            .take(MAX_BUTTONS)
            .map(|b| WireButton {
                label: b.label.clone(),
                url: b.url.clone(),
            })
            .collect(),
    }
}

fn map_timestamps(timestamps: &Timestamps) -> Option<WireTimestamps> {
    let start = timestamps.start?;

    Some(WireTimestamps {
        start: epoch_millis(start),
        end: timestamps.end.map(epoch_millis),
    })
}

fn map_party(party: &Party) -> WireParty {
    WireParty {
        id: party.id.clone(),
        size: [party.current_size, party.max_size],
    }
}

fn map_secrets(secrets: &Secrets) -> WireSecrets {
    WireSecrets {
        match_secret: non_empty(&secrets.match_secret),
        join: non_empty(&secrets.join),
        spectate: non_empty(&secrets.spectate),
    }
}

fn epoch_millis(time: SystemTime) -> u64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}
