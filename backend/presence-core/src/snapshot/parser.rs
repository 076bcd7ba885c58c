use common::truncate_chars;

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;

const KEY_VALUE_PATTERN: &str = r"^(?P<key>[^:]+?)\s*:\s*(?P<value>.+)$";
const ANSI_ESCAPE_PATTERN: &str = r"\x1b\[[0-9;?]*[ -/]*[@-~]";
const CAPTURE_KEY: &str = "key";
const CAPTURE_VALUE: &str = "value";
const SEPARATOR_PREFIX: &str = "---";

/// Fields shown in the static details, in display order.
const DETAIL_KEYS: [&str; 5] = ["OS", "Kernel", "Packages", "CPU", "Memory"];

static KEY_VALUE_REGEX: OnceLock<Regex> = OnceLock::new();
static ANSI_REGEX: OnceLock<Regex> = OnceLock::new();

fn key_value_regex() -> &'static Regex {
    KEY_VALUE_REGEX.get_or_init(|| Regex::new(KEY_VALUE_PATTERN).expect("valid regex pattern"))
}

fn ansi_regex() -> &'static Regex {
    ANSI_REGEX.get_or_init(|| Regex::new(ANSI_ESCAPE_PATTERN).expect("valid regex pattern"))
}

/// Parsed system-info output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SystemSnapshot {
    fields: HashMap<String, String>,
    user_host: Option<String>,
}

impl SystemSnapshot {
    pub fn parse(output: &str) -> Self {
        let cleaned = ansi_regex().replace_all(output, "");
        let mut snapshot = Self::default();

        for raw in cleaned.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with(SEPARATOR_PREFIX) {
                continue;
            }

            if snapshot.user_host.is_none() && line.contains('@') && !line.contains(' ') {
                snapshot.user_host = Some(line.to_string());
                continue;
            }

            if let Some(captures) = key_value_regex().captures(line) {
                let key = captures[CAPTURE_KEY].trim();
                let value = captures[CAPTURE_VALUE].trim();
                if !key.is_empty() && !value.is_empty() {
                    snapshot.fields.insert(key.to_string(), value.to_string());
                }
            }
        }

        snapshot
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// `user@host` line, if the tool printed one.
    pub fn user_host(&self) -> Option<&str> {
        self.user_host.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.user_host.is_none()
    }

    /// `Key: Value` lines for the detail fields, truncated to `max_chars`.
    pub fn static_details(&self, max_chars: usize) -> String {
        let lines: Vec<String> = DETAIL_KEYS
            .iter()
            .filter_map(|key| self.get(key).map(|value| format!("{key}: {value}")))
            .collect();

        truncate_chars(&lines.join("\n"), max_chars)
    }

    /// Asset key for the large image: distro first, then GPU vendor.
    pub fn image_key(&self, default: &str) -> String {
        if let Some(os) = self.get("OS") {
            let os = os.to_lowercase();
            if os.contains("arch") {
                return "arch".to_string();
            }
            if os.contains("ubuntu") {
                return "ubuntu".to_string();
            }
        }

        if let Some(gpu) = self.get("GPU") {
            let gpu = gpu.to_lowercase();
            if gpu.contains("amd") || gpu.contains("radeon") {
                return "radeon".to_string();
            }
            if gpu.contains("nvidia") {
                return "nvidia".to_string();
            }
        }

        default.to_string()
    }

    /// Desktop environment, falling back to the window manager.
    pub fn large_text(&self) -> Option<&str> {
        self.get("DE").or_else(|| self.get("WM"))
    }
}
