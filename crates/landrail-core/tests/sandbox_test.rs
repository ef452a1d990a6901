//! Integration tests against the running kernel.
//!
//! Landlock restricts only the calling thread, so every test that enforces a
//! ruleset does so on a freshly spawned thread and leaves the test harness
//! untouched. Tests return early when the kernel has no usable Landlock.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::print_stderr)]

use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::Path;
use std::thread;

use landrail_common::config::SandboxPolicy;
use landrail_common::constants::MAX_COMPOSED_RULESETS;
use landrail_common::error::{ErrorKind, LandrailError, Status};
use landrail_common::types::{AccessFs, CompatMode, RequestedAbi, RestrictSelfFlags};
use landrail_core::{ApplyPolicy, RulesetAttr};

fn unsupported(err: &LandrailError) -> bool {
    let skip = err.kind().is_unsupported();
    if skip {
        eprintln!("SKIP: landlock unavailable ({err})");
    }
    skip
}

fn in_thread(f: impl FnOnce() + Send + 'static) {
    thread::spawn(f).join().expect("sandboxed thread panicked");
}

fn scratch_file(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, b"ok\n").unwrap();
    path
}

// ── Queries ──────────────────────────────────────────────────────────

#[test]
fn abi_version_query() {
    match landrail_core::abi_version() {
        Ok(abi) => assert!(abi.get() >= 1),
        Err(err) => assert!(unsupported(&err), "unexpected ABI query failure: {err}"),
    }
}

#[test]
fn errata_query() {
    if let Err(err) = landrail_core::errata() {
        assert!(unsupported(&err), "unexpected errata query failure: {err}");
    }
}

// ── Enforcement ──────────────────────────────────────────────────────

#[test]
fn read_allowed_beneath_granted_directory_only() {
    let allowed = tempfile::tempdir().unwrap();
    let other = tempfile::tempdir().unwrap();
    let inside = scratch_file(allowed.path(), "allowed.txt");
    let outside = scratch_file(other.path(), "denied.txt");

    in_thread(move || {
        let mut attr = RulesetAttr::new(RequestedAbi::Latest, CompatMode::BestEffort);
        let _ = attr.handle_fs(AccessFs::READ_GROUP);
        let ruleset = match attr.create() {
            Ok((ruleset, _)) => ruleset,
            Err(err) if unsupported(&err) => return,
            Err(err) => panic!("create failed: {err}"),
        };
        ruleset
            .add_path(inside.parent().unwrap(), AccessFs::READ_GROUP, 0)
            .unwrap();
        match ruleset.enforce(RestrictSelfFlags::empty()) {
            Ok(status) => assert_eq!(status, Status::Ok),
            Err(err) if unsupported(&err) => return,
            Err(err) => panic!("enforce failed: {err}"),
        }
        ruleset.close();

        assert_eq!(fs::read(&inside).unwrap(), b"ok\n");
        let denied = fs::read(&outside).unwrap_err();
        assert_eq!(denied.kind(), IoErrorKind::PermissionDenied);
    });
}

#[test]
fn read_only_policy_denies_writes() {
    let dir = tempfile::tempdir().unwrap();
    let file = scratch_file(dir.path(), "data.txt");
    let policy = SandboxPolicy {
        handled_fs: AccessFs::READ_GROUP | AccessFs::WRITE_FILE,
        ..SandboxPolicy::default()
    }
    .allow_path(dir.path(), AccessFs::READ_GROUP);

    in_thread(move || {
        match policy.apply() {
            Ok(_) => {}
            Err(err) if unsupported(&err) => return,
            Err(err) => panic!("apply failed: {err}"),
        }
        assert!(fs::read(&file).is_ok());
        let denied = fs::OpenOptions::new().write(true).open(&file).unwrap_err();
        assert_eq!(denied.kind(), IoErrorKind::PermissionDenied);
    });
}

#[test]
fn composition_hits_the_limit() {
    in_thread(|| {
        let mut attr = RulesetAttr::new(RequestedAbi::Latest, CompatMode::BestEffort);
        let _ = attr.handle_fs(AccessFs::MAKE_FIFO);
        let ruleset = match attr.create() {
            Ok((ruleset, _)) => ruleset,
            Err(err) if unsupported(&err) => return,
            Err(err) => panic!("create failed: {err}"),
        };

        let mut layers = 0;
        let err = loop {
            match ruleset.enforce(RestrictSelfFlags::empty()) {
                Ok(_) => layers += 1,
                Err(err) => break err,
            }
            assert!(layers <= MAX_COMPOSED_RULESETS, "no composition limit");
        };
        if layers == 0 && unsupported(&err) {
            return;
        }
        assert!(layers >= 1);
        assert_eq!(err.kind(), ErrorKind::RestrictLimitReached);
    });
}

#[test]
fn strict_request_beyond_kernel_abi_is_incompatible() {
    let Ok(abi) = landrail_core::abi_version() else {
        return;
    };
    let mut attr = RulesetAttr::new(RequestedAbi::from(abi.get() + 1), CompatMode::Strict);
    let _ = attr.handle_fs(AccessFs::READ_FILE);
    let err = attr.create().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RulesetIncompatible);
}
