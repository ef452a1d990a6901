//! `landrail run`: Run a command inside a Landlock sandbox.

use std::os::unix::process::CommandExt;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Context, bail};
use clap::Args;
use landrail_common::config::SandboxPolicy;
use landrail_common::error::Status;
use landrail_common::types::{AccessFs, AccessNet, CompatMode, RequestedAbi};
use landrail_core::ApplyPolicy;

/// Arguments for the `run` command.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON sandbox policy; the grants below are added to it.
    #[arg(long, value_name = "FILE")]
    pub policy: Option<PathBuf>,

    /// Allow reading and executing beneath a path.
    #[arg(long = "ro", value_name = "PATH")]
    pub read_only: Vec<PathBuf>,

    /// Allow every filesystem right beneath a path.
    #[arg(long = "rw", value_name = "PATH")]
    pub read_write: Vec<PathBuf>,

    /// Allow binding a TCP port.
    #[arg(long, value_name = "PORT")]
    pub bind: Vec<u16>,

    /// Allow connecting to a TCP port.
    #[arg(long, value_name = "PORT")]
    pub connect: Vec<u16>,

    /// Fail instead of running with a weaker sandbox than requested.
    #[arg(long)]
    pub strict: bool,

    /// Landlock ABI version to target (0 for the kernel's latest).
    #[arg(long, env = "LANDRAIL_ABI", value_name = "N")]
    pub abi: Option<u32>,

    /// Command to run.
    #[arg(trailing_var_arg = true, required = true)]
    pub command: Vec<String>,
}

/// Executes the `run` command.
///
/// Enforces the sandbox on the current process, then replaces it with the
/// requested command. Only returns on failure.
///
/// # Errors
///
/// Returns an error if the policy cannot be loaded or enforced, or the
/// command cannot be executed.
pub fn execute(args: RunArgs) -> anyhow::Result<()> {
    let policy = build_policy(&args)?;
    let status = policy.apply().context("failed to enforce sandbox")?;
    if status == Status::OkPartialSandbox {
        tracing::warn!("running with a partial sandbox: the kernel lacks some requested rights");
    }

    let Some((program, rest)) = args.command.split_first() else {
        bail!("no command given");
    };
    tracing::info!(%program, "executing sandboxed command");
    let err = Command::new(program).args(rest).exec();
    Err(err).with_context(|| format!("failed to execute {program}"))
}

/// Builds the policy from the optional policy file and command-line grants.
///
/// # Errors
///
/// Returns an error if the policy file cannot be read or parsed, or a granted
/// path does not exist.
pub fn build_policy(args: &RunArgs) -> anyhow::Result<SandboxPolicy> {
    let mut policy = match &args.policy {
        Some(path) => load_policy(path)?,
        None => SandboxPolicy {
            handled_fs: AccessFs::all(),
            ..SandboxPolicy::default()
        },
    };

    if args.strict {
        policy.compat = CompatMode::Strict;
    }
    if let Some(abi) = args.abi {
        policy.abi = RequestedAbi::from(abi);
    }

    for path in &args.read_only {
        let access = path_access(path, AccessFs::EXECUTE_GROUP)?;
        policy.handled_fs |= access;
        policy = policy.allow_path(path, access);
    }
    for path in &args.read_write {
        let access = path_access(path, AccessFs::all())?;
        policy.handled_fs |= access;
        policy = policy.allow_path(path, access);
    }
    for &port in &args.bind {
        policy.handled_net |= AccessNet::BIND_TCP;
        policy = policy.allow_port(u64::from(port), AccessNet::BIND_TCP);
    }
    for &port in &args.connect {
        policy.handled_net |= AccessNet::CONNECT_TCP;
        policy = policy.allow_port(u64::from(port), AccessNet::CONNECT_TCP);
    }

    tracing::debug!(
        paths = policy.paths.len(),
        ports = policy.ports.len(),
        compat = %policy.compat,
        "sandbox policy assembled"
    );
    Ok(policy)
}

fn load_policy(path: &Path) -> anyhow::Result<SandboxPolicy> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read policy {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid policy {}", path.display()))
}

/// Directory-only rights are stripped for files.
fn path_access(path: &Path, access: AccessFs) -> anyhow::Result<AccessFs> {
    let metadata =
        std::fs::metadata(path).with_context(|| format!("cannot access {}", path.display()))?;
    Ok(if metadata.is_dir() {
        access
    } else {
        access - AccessFs::DIR_ONLY
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use landrail_common::types::AbiVersion;

    use super::*;

    fn args() -> RunArgs {
        RunArgs {
            policy: None,
            read_only: Vec::new(),
            read_write: Vec::new(),
            bind: Vec::new(),
            connect: Vec::new(),
            strict: false,
            abi: None,
            command: vec!["true".to_owned()],
        }
    }

    #[test]
    fn default_policy_handles_every_filesystem_right() {
        let policy = build_policy(&args()).unwrap();
        assert_eq!(policy.handled_fs, AccessFs::all());
        assert!(policy.handled_net.is_empty());
        assert_eq!(policy.compat, CompatMode::BestEffort);
        assert_eq!(policy.abi, RequestedAbi::Latest);
    }

    #[test]
    fn file_grants_drop_directory_rights() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("bin");
        std::fs::write(&file, b"").unwrap();
        let policy = build_policy(&RunArgs {
            read_only: vec![dir.path().to_path_buf(), file],
            ..args()
        })
        .unwrap();
        assert_eq!(policy.paths[0].access, AccessFs::EXECUTE_GROUP);
        assert_eq!(policy.paths[1].access, AccessFs::EXECUTE | AccessFs::READ_FILE);
    }

    #[test]
    fn port_grants_enable_network_class() {
        let policy = build_policy(&RunArgs {
            bind: vec![8080],
            connect: vec![443],
            strict: true,
            abi: Some(4),
            ..args()
        })
        .unwrap();
        assert_eq!(policy.handled_net, AccessNet::all());
        assert_eq!(policy.ports.len(), 2);
        assert_eq!(policy.compat, CompatMode::Strict);
        assert_eq!(policy.abi, RequestedAbi::Exact(AbiVersion::V4));
    }

    #[test]
    fn policy_file_is_extended_by_flags() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "handled_fs": "READ_FILE", "compat": "strict" }}"#).unwrap();
        let policy = build_policy(&RunArgs {
            policy: Some(file.path().to_path_buf()),
            read_write: vec![dir.path().to_path_buf()],
            ..args()
        })
        .unwrap();
        assert_eq!(policy.compat, CompatMode::Strict);
        assert_eq!(policy.handled_fs, AccessFs::all());
        assert_eq!(policy.paths.len(), 1);
    }

    #[test]
    fn missing_grant_path_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_policy(&RunArgs {
            read_only: vec![dir.path().join("absent")],
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().contains("cannot access"));
    }

    #[test]
    fn malformed_policy_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "unknown": 1 }}"#).unwrap();
        let err = build_policy(&RunArgs {
            policy: Some(file.path().to_path_buf()),
            ..args()
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("invalid policy"));
    }
}
