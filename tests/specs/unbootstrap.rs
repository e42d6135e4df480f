//! `nodeagent unbootstrap` specs: the reverse/cleanup step list runs
//! best-effort. In this scratch fixture there is no kubelet, containerd,
//! or systemd/dbus to clean up, so every step fails — but the command
//! itself must still report success.

use crate::support::{Fixture, OutputAssertExt};

#[test]
fn exits_zero_even_when_every_step_fails() {
    let fixture = Fixture::new();
    fixture.nodeagent().arg("unbootstrap").passes();
}

#[test]
fn exits_zero_on_a_freshly_created_empty_install_root() {
    let fixture = Fixture::new();
    // No bootstrap ever ran here: bin/cni/etc roots are all empty.
    fixture.nodeagent().arg("unbootstrap").passes();
    fixture.nodeagent().arg("unbootstrap").passes();
}
