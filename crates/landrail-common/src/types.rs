//! Domain primitive types used across the landrail workspace.

use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, LandrailError, Status};

/// Landlock ABI version: an ordinal where every version supports a superset
/// of the rights of all lower versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbiVersion(u32);

impl AbiVersion {
    /// Pre-versioning baseline (kernel 5.13).
    pub const V1: Self = Self(1);
    /// Adds `REFER` (kernel 5.19).
    pub const V2: Self = Self(2);
    /// Adds `TRUNCATE` (kernel 6.2).
    pub const V3: Self = Self(3);
    /// Adds TCP bind/connect control (kernel 6.7).
    pub const V4: Self = Self(4);
    /// Adds `IOCTL_DEV` (kernel 6.10).
    pub const V5: Self = Self(5);
    /// Adds signal and abstract unix socket scoping (kernel 6.12).
    pub const V6: Self = Self(6);
    /// Adds restrict-self logging flags (kernel 6.15).
    pub const V7: Self = Self(7);

    /// Creates a version from its ordinal.
    #[must_use]
    pub const fn new(version: u32) -> Self {
        Self(version)
    }

    /// Returns the ordinal.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AbiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// ABI version requested by a caller before negotiation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestedAbi {
    /// Whatever the running kernel supports.
    #[default]
    Latest,
    /// A specific version.
    Exact(AbiVersion),
}

impl From<AbiVersion> for RequestedAbi {
    fn from(version: AbiVersion) -> Self {
        Self::Exact(version)
    }
}

impl From<u32> for RequestedAbi {
    /// Maps `0` to [`RequestedAbi::Latest`] and any other value to that version.
    fn from(version: u32) -> Self {
        if version == 0 {
            Self::Latest
        } else {
            Self::Exact(AbiVersion(version))
        }
    }
}

impl fmt::Display for RequestedAbi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => write!(f, "latest"),
            Self::Exact(v) => write!(f, "{v}"),
        }
    }
}

/// Policy applied whenever a request exceeds what the effective ABI supports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompatMode {
    /// Fail instead of producing a weaker sandbox.
    Strict,
    /// Silently drop what the kernel cannot enforce.
    #[default]
    BestEffort,
}

impl CompatMode {
    /// Decides the outcome of intersecting a request with what is supported.
    ///
    /// `requested` and `granted` are the values before and after masking.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::PartialSandboxStrict`] when bits were lost in
    /// strict mode.
    pub fn negotiate<T: PartialEq>(self, requested: &T, granted: &T) -> Result<Status, LandrailError> {
        if requested == granted {
            return Ok(Status::Ok);
        }
        match self {
            Self::Strict => Err(ErrorKind::PartialSandboxStrict.into()),
            Self::BestEffort => Ok(Status::OkPartialSandbox),
        }
    }
}

impl fmt::Display for CompatMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::BestEffort => write!(f, "best-effort"),
        }
    }
}

/// Partition of the access-right space. Masks never cross classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u32)]
pub enum AccessClass {
    /// Filesystem access rights.
    Filesystem = 0,
    /// Network access rights.
    Network = 1,
    /// Inter-process scopes.
    Scope = 2,
}

impl AccessClass {
    /// All classes in declaration order.
    pub const ALL: [Self; 3] = [Self::Filesystem, Self::Network, Self::Scope];
}

impl TryFrom<u32> for AccessClass {
    type Error = LandrailError;

    fn try_from(raw: u32) -> Result<Self, Self::Error> {
        match raw {
            0 => Ok(Self::Filesystem),
            1 => Ok(Self::Network),
            2 => Ok(Self::Scope),
            _ => Err(ErrorKind::InvalidArgument.into()),
        }
    }
}

impl fmt::Display for AccessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filesystem => write!(f, "filesystem"),
            Self::Network => write!(f, "network"),
            Self::Scope => write!(f, "scope"),
        }
    }
}

bitflags! {
    /// Filesystem access rights (`LANDLOCK_ACCESS_FS_*`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AccessFs: u64 {
        /// Execute a file.
        const EXECUTE = 1 << 0;
        /// Open a file with write access.
        const WRITE_FILE = 1 << 1;
        /// Open a file with read access.
        const READ_FILE = 1 << 2;
        /// Open a directory or list its content.
        const READ_DIR = 1 << 3;
        /// Remove an empty directory or rename one.
        const REMOVE_DIR = 1 << 4;
        /// Unlink or rename a file.
        const REMOVE_FILE = 1 << 5;
        /// Create a character device.
        const MAKE_CHAR = 1 << 6;
        /// Create a directory.
        const MAKE_DIR = 1 << 7;
        /// Create a regular file.
        const MAKE_REG = 1 << 8;
        /// Create a UNIX domain socket.
        const MAKE_SOCK = 1 << 9;
        /// Create a named pipe.
        const MAKE_FIFO = 1 << 10;
        /// Create a block device.
        const MAKE_BLOCK = 1 << 11;
        /// Create a symbolic link.
        const MAKE_SYM = 1 << 12;
        /// Link or rename a file from or to a different directory.
        const REFER = 1 << 13;
        /// Truncate a file.
        const TRUNCATE = 1 << 14;
        /// Invoke `ioctl(2)` on a character or block device.
        const IOCTL_DEV = 1 << 15;
    }
}

impl AccessFs {
    /// Reading files and listing directories.
    pub const READ_GROUP: Self = Self::READ_FILE.union(Self::READ_DIR);

    /// Every right that modifies the filesystem.
    pub const WRITE_GROUP: Self = Self::WRITE_FILE
        .union(Self::REMOVE_DIR)
        .union(Self::REMOVE_FILE)
        .union(Self::MAKE_CHAR)
        .union(Self::MAKE_DIR)
        .union(Self::MAKE_REG)
        .union(Self::MAKE_SOCK)
        .union(Self::MAKE_FIFO)
        .union(Self::MAKE_BLOCK)
        .union(Self::MAKE_SYM)
        .union(Self::REFER);

    /// Executing, which implies reading.
    pub const EXECUTE_GROUP: Self = Self::EXECUTE.union(Self::READ_GROUP);

    /// Rights that only make sense on a directory.
    pub const DIR_ONLY: Self = Self::READ_DIR.union(Self::REMOVE_DIR).union(Self::MAKE_DIR);
}

bitflags! {
    /// Network access rights (`LANDLOCK_ACCESS_NET_*`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct AccessNet: u64 {
        /// Bind a TCP socket to a local port.
        const BIND_TCP = 1 << 0;
        /// Connect a TCP socket to a remote port.
        const CONNECT_TCP = 1 << 1;
    }
}

bitflags! {
    /// IPC scopes (`LANDLOCK_SCOPE_*`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Scope: u64 {
        /// Deny connecting to abstract unix sockets created outside the domain.
        const ABSTRACT_UNIX_SOCKET = 1 << 0;
        /// Deny sending signals to processes outside the domain.
        const SIGNAL = 1 << 1;
    }
}

bitflags! {
    /// Flags for `landlock_restrict_self(2)` (`LANDLOCK_RESTRICT_SELF_*`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct RestrictSelfFlags: u32 {
        /// Do not log denials for the current executable.
        const LOG_SAME_EXEC_OFF = 1 << 0;
        /// Log denials after the next `execve(2)`.
        const LOG_NEW_EXEC_ON = 1 << 1;
        /// Do not log denials from nested domains.
        const LOG_SUBDOMAINS_OFF = 1 << 2;
    }
}

bitflags! {
    /// Flags for `landlock_create_ruleset(2)` (`LANDLOCK_CREATE_RULESET_*`).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct CreateFlags: u32 {
        /// Query the ABI version instead of creating a ruleset.
        const VERSION = 1 << 0;
        /// Query the errata bitmask instead of creating a ruleset.
        const ERRATA = 1 << 1;
    }
}
