//! Endpoint resolution for the presence socket.
//!
//! The presence application listens on `discord-ipc-<n>` inside a runtime
//! directory that depends on how it was installed. Resolution probes, in
//! order:
//!
//! 1. Known sandbox directories (snap, flatpak) under `/run/user/<uid>`
//! 2. Environment variables (`XDG_RUNTIME_DIR`, `TMPDIR`, `TMP`, `TEMP`)
//! 3. `/tmp`
//!
//! The first hit is cached for the lifetime of the resolver, so repeated
//! connects never touch the filesystem or environment again.
//!
//! On Windows the endpoint is a named pipe and no directory is resolved.

use crate::{IPC_PIPE_PREFIX, IPC_SOCKET_PREFIX, IPC_SOCKET_SLOTS};

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::path::{Path, PathBuf};

use log::debug;
use once_cell::sync::OnceCell;

pub const ENDPOINT_ENV_VARS: [&str; 4] = ["XDG_RUNTIME_DIR", "TMPDIR", "TMP", "TEMP"];
pub const FALLBACK_DIR: &str = "/tmp";

const DEFAULT_UID: u32 = 1000;
const SNAP_SUBDIR: &str = "snap.discord";
const FLATPAK_SUBDIR: &str = ".flatpak/com.discordapp.Discord/xdg-run";

/// Source of filesystem and environment facts for resolution.
pub trait EndpointProbe: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn var(&self, name: &str) -> Option<String>;
}

/// Probe backed by the real filesystem and process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl EndpointProbe for SystemProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Address of one candidate listener.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Socket(PathBuf),
    Pipe(String),
}

impl Display for Endpoint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        match self {
            Endpoint::Socket(path) => write!(formatter, "{}", path.display()),
            Endpoint::Pipe(name) => write!(formatter, "{name}"),
        }
    }
}

pub struct EndpointResolver<P: EndpointProbe = SystemProbe> {
    probe: P,
    known_dirs: Vec<PathBuf>,
    env_vars: Vec<String>,
    fallback: PathBuf,
    resolved: OnceCell<PathBuf>,
}

impl EndpointResolver<SystemProbe> {
    pub fn new() -> Self {
        Self::with_probe(SystemProbe)
    }
}

impl Default for EndpointResolver<SystemProbe> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: EndpointProbe> EndpointResolver<P> {
    pub fn with_probe(probe: P) -> Self {
        Self {
            probe,
            known_dirs: default_known_dirs(),
            env_vars: ENDPOINT_ENV_VARS.iter().map(|s| s.to_string()).collect(),
            fallback: PathBuf::from(FALLBACK_DIR),
            resolved: OnceCell::new(),
        }
    }

    pub fn with_known_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.known_dirs = dirs;
        self
    }

    pub fn with_env_vars(mut self, names: &[&str]) -> Self {
        self.env_vars = names.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_fallback(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fallback = dir.into();
        self
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    /// Directory holding the presence sockets.
    ///
    /// Probes on first call only; later calls return the cached answer.
    pub fn resolve(&self) -> &Path {
        self.resolved.get_or_init(|| self.probe_dir())
    }

    /// Candidate endpoints in connection order.
    pub fn endpoints(&self) -> Vec<Endpoint> {
        if cfg!(windows) {
            return (0..IPC_SOCKET_SLOTS)
                .map(|slot| Endpoint::Pipe(format!("{IPC_PIPE_PREFIX}{slot}")))
                .collect();
        }

        let dir = self.resolve();
        (0..IPC_SOCKET_SLOTS)
            .map(|slot| Endpoint::Socket(dir.join(format!("{IPC_SOCKET_PREFIX}{slot}"))))
            .collect()
    }

    fn probe_dir(&self) -> PathBuf {
        for dir in &self.known_dirs {
            if self.probe.exists(dir) {
                debug!("Using known IPC directory {}", dir.display());
                return dir.clone();
            }
        }

        for name in &self.env_vars {
            if let Some(value) = self.probe.var(name)
                && !value.is_empty()
            {
                debug!("Using IPC directory from {name}: {value}");
                return PathBuf::from(value);
            }
        }

        debug!("Falling back to {}", self.fallback.display());
        self.fallback.clone()
    }
}

fn default_known_dirs() -> Vec<PathBuf> {
    let runtime = PathBuf::from(format!("/run/user/{}", current_uid()));
    vec![runtime.join(SNAP_SUBDIR), runtime.join(FLATPAK_SUBDIR)]
}

#[cfg(unix)]
fn current_uid() -> u32 {
    use std::os::unix::fs::MetadataExt;

    std::fs::metadata("/proc/self")
        .map(|m| m.uid())
        .unwrap_or(DEFAULT_UID)
}

#[cfg(not(unix))]
fn current_uid() -> u32 {
    DEFAULT_UID
}
