//! Text helpers for presence status strings.

const BYTE_UNIT: u64 = 1024;
const UNIT_PREFIXES: &[u8] = b"KMGTPE";
const ELLIPSIS: &str = "...";

/// Render a byte count with a binary suffix.
///
/// Values below 1024 are printed verbatim (`"1023 B"`); anything larger is
/// scaled by powers of 1024 and printed with one decimal (`"1.5 KiB"`).
pub fn human_bytes(bytes: u64) -> String {
    if bytes < BYTE_UNIT {
        return format!("{bytes} B");
    }

    let mut divisor = BYTE_UNIT;
    let mut exponent = 0;
    let mut remaining = bytes / BYTE_UNIT;
    while remaining >= BYTE_UNIT {
        divisor *= BYTE_UNIT;
        exponent += 1;
        remaining /= BYTE_UNIT;
    }

    format!(
        "{:.1} {}iB",
        bytes as f64 / divisor as f64,
        UNIT_PREFIXES[exponent] as char
    )
}

/// Cut `text` down to at most `max_chars` characters.
///
/// Counts chars rather than bytes so multi-byte glyphs are never split. When
/// there is room, the last three characters are replaced with `...`.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if max_chars == 0 {
        return String::new();
    }

    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    if max_chars > ELLIPSIS.len() {
        let kept: String = text.chars().take(max_chars - ELLIPSIS.len()).collect();
        format!("{kept}{ELLIPSIS}")
    } else {
        text.chars().take(max_chars).collect()
    }
}
