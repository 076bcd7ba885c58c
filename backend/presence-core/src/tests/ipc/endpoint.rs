// Unit tests for endpoint resolution
// A counting probe stands in for the filesystem and environment

use crate::ipc::endpoint::{Endpoint, EndpointProbe, EndpointResolver};
use crate::{IPC_SOCKET_PREFIX, IPC_SOCKET_SLOTS};

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
struct CountingProbe {
    existing: Vec<PathBuf>,
    vars: HashMap<String, String>,
    probes: AtomicUsize,
}

impl CountingProbe {
    fn with_dir(mut self, dir: &str) -> Self {
        self.existing.push(PathBuf::from(dir));
        self
    }

    fn with_var(mut self, name: &str, value: &str) -> Self {
        self.vars.insert(name.to_string(), value.to_string());
        self
    }

    fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

impl EndpointProbe for CountingProbe {
    fn exists(&self, path: &Path) -> bool {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.existing.iter().any(|p| p == path)
    }

    fn var(&self, name: &str) -> Option<String> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.vars.get(name).cloned()
    }
}

fn resolver(probe: CountingProbe) -> EndpointResolver<CountingProbe> {
    EndpointResolver::with_probe(probe)
        .with_known_dirs(vec![
            PathBuf::from("/run/user/1000/snap.discord"),
            PathBuf::from("/run/user/1000/.flatpak/com.discordapp.Discord/xdg-run"),
        ])
        .with_fallback("/tmp")
}

/// **VALUE**: Verifies known sandbox directories beat environment variables.
///
/// **WHY THIS MATTERS**: Snap and flatpak installs put the socket in their own
/// runtime dir while XDG_RUNTIME_DIR still points at the host one.
///
/// **BUG THIS CATCHES**: Would catch checking env vars before known dirs.
#[test]
fn given_known_dir_and_env_var_when_resolve_then_known_dir_wins() {
    // GIVEN: The flatpak dir exists and XDG_RUNTIME_DIR is set
    let probe = CountingProbe::default()
        .with_dir("/run/user/1000/.flatpak/com.discordapp.Discord/xdg-run")
        .with_var("XDG_RUNTIME_DIR", "/run/user/1000");

    // WHEN: Resolving
    let resolver = resolver(probe);

    // THEN: The flatpak dir is chosen
    assert_eq!(
        resolver.resolve(),
        Path::new("/run/user/1000/.flatpak/com.discordapp.Discord/xdg-run")
    );
}

/// **VALUE**: Verifies environment variables are consulted in priority order.
///
/// **WHY THIS MATTERS**: TMPDIR and TEMP can both be set; picking the wrong one
/// means connecting to a directory with no socket.
///
/// **BUG THIS CATCHES**: Would catch iterating a HashMap or reversing the order.
#[test]
fn given_several_env_vars_when_resolve_then_first_in_priority_order_wins() {
    // GIVEN: No known dirs, TMPDIR and TEMP set, XDG_RUNTIME_DIR empty
    let probe = CountingProbe::default()
        .with_var("XDG_RUNTIME_DIR", "")
        .with_var("TEMP", "/temp")
        .with_var("TMPDIR", "/tmpdir");

    // WHEN: Resolving
    let resolver = resolver(probe);

    // THEN: TMPDIR wins; the empty XDG_RUNTIME_DIR is skipped
    assert_eq!(resolver.resolve(), Path::new("/tmpdir"));
}

#[test]
fn given_nothing_set_when_resolve_then_falls_back_to_tmp() {
    let resolver = resolver(CountingProbe::default());

    assert_eq!(resolver.resolve(), Path::new("/tmp"));
}

/// **VALUE**: Verifies the first answer is cached for the resolver's lifetime.
///
/// **WHY THIS MATTERS**: Reconnects happen every time the presence app restarts.
/// Re-probing would also let a changed environment move the endpoint mid-run.
///
/// **BUG THIS CATCHES**: Would catch resolving on every call.
#[test]
fn given_resolved_once_when_resolve_again_then_no_further_probes() {
    // GIVEN: A resolver that already answered once
    let resolver = resolver(CountingProbe::default().with_var("TMP", "/tmp-var"));
    let first = resolver.resolve().to_path_buf();
    let probes_after_first = resolver_probes(&resolver);
    assert!(probes_after_first > 0);

    // WHEN: Resolving and listing endpoints again
    let second = resolver.resolve().to_path_buf();
    let _ = resolver.endpoints();

    // THEN: Same answer, no new probes
    assert_eq!(first, second);
    assert_eq!(resolver_probes(&resolver), probes_after_first);
}

fn resolver_probes(resolver: &EndpointResolver<CountingProbe>) -> usize {
    resolver.probe().probes()
}

#[cfg(unix)]
#[test]
fn given_resolved_dir_when_endpoints_then_lists_every_socket_slot_in_order() {
    let resolver = resolver(CountingProbe::default().with_var("XDG_RUNTIME_DIR", "/run/user/42"));

    let endpoints = resolver.endpoints();

    assert_eq!(endpoints.len(), IPC_SOCKET_SLOTS as usize);
    assert_eq!(
        endpoints[0],
        Endpoint::Socket(PathBuf::from(format!("/run/user/42/{IPC_SOCKET_PREFIX}0")))
    );
    assert_eq!(
        endpoints[9].to_string(),
        format!("/run/user/42/{IPC_SOCKET_PREFIX}9")
    );
}
