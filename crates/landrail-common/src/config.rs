//! Serializable sandbox policy.
//!
//! A [`SandboxPolicy`] describes a complete sandbox (what to restrict, what
//! to grant back, and how to enforce) independently of the running kernel.
//! It is usually loaded from JSON:
//!
//! ```json
//! {
//!   "abi": "latest",
//!   "compat": "best_effort",
//!   "handled_fs": "READ_FILE | READ_DIR | WRITE_FILE",
//!   "paths": [{ "path": "/usr", "access": "READ_FILE | READ_DIR" }],
//!   "ports": [{ "port": 443, "access": "CONNECT_TCP" }]
//! }
//! ```

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::types::{AccessFs, AccessNet, CompatMode, CreateFlags, RequestedAbi, RestrictSelfFlags, Scope};

/// Complete description of a sandbox to build and enforce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SandboxPolicy {
    /// Requested ABI version.
    pub abi: RequestedAbi,
    /// Behavior when the kernel cannot honor the request.
    pub compat: CompatMode,
    /// Filesystem rights the ruleset restricts.
    pub handled_fs: AccessFs,
    /// Network rights the ruleset restricts.
    pub handled_net: AccessNet,
    /// IPC scopes the ruleset restricts.
    pub scoped: Scope,
    /// Flags passed when creating the ruleset.
    pub create_flags: CreateFlags,
    /// Path-beneath grants.
    pub paths: Vec<PathGrant>,
    /// TCP port grants.
    pub ports: Vec<PortGrant>,
    /// Flags passed when enforcing the ruleset.
    pub restrict_flags: RestrictSelfFlags,
}

impl Default for SandboxPolicy {
    fn default() -> Self {
        Self {
            abi: RequestedAbi::Latest,
            compat: CompatMode::BestEffort,
            handled_fs: AccessFs::empty(),
            handled_net: AccessNet::empty(),
            scoped: Scope::empty(),
            create_flags: CreateFlags::empty(),
            paths: Vec::new(),
            ports: Vec::new(),
            restrict_flags: RestrictSelfFlags::empty(),
        }
    }
}

impl SandboxPolicy {
    /// Adds a path grant, returning the updated policy.
    #[must_use]
    pub fn allow_path(mut self, path: impl Into<PathBuf>, access: AccessFs) -> Self {
        self.paths.push(PathGrant {
            path: path.into(),
            access,
        });
        self
    }

    /// Adds a port grant, returning the updated policy.
    #[must_use]
    pub fn allow_port(mut self, port: u64, access: AccessNet) -> Self {
        self.ports.push(PortGrant { port, access });
        self
    }
}

/// Access granted beneath a filesystem path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathGrant {
    /// File or directory the grant is rooted at.
    pub path: PathBuf,
    /// Rights granted on it and its descendants.
    pub access: AccessFs,
}

/// Access granted on a TCP port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PortGrant {
    /// Port number; values above 65535 are rejected when the rule is added.
    pub port: u64,
    /// Rights granted on the port.
    pub access: AccessNet,
}
