//! Raw kernel channels consumed by the negotiation layer.
//!
//! [`Kernel`] is the seam between policy logic and the running kernel: every
//! call returns the raw `errno` on failure and leaves its interpretation to
//! [`crate::translate`]. [`Landlock`] is the production implementation
//! backed by the `landlock_*` syscalls, `prctl(2)` and a netlink probe.

#![allow(unsafe_code)]

use std::os::fd::{BorrowedFd, OwnedFd};

use landrail_common::types::{AccessFs, AccessNet, CreateFlags, RestrictSelfFlags};
use nix::errno::Errno;

/// `struct landlock_ruleset_attr`.
#[repr(C)]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RulesetAttrRaw {
    /// Filesystem rights handled by the ruleset.
    pub handled_access_fs: u64,
    /// Network rights handled by the ruleset.
    pub handled_access_net: u64,
    /// IPC scopes handled by the ruleset.
    pub scoped: u64,
}

/// A single grant handed to [`Kernel::add_rule`]. Never stored.
#[derive(Debug, Clone, Copy)]
pub enum Rule<'fd> {
    /// Access beneath an opened file hierarchy.
    PathBeneath {
        /// File or directory the rule is rooted at.
        parent: BorrowedFd<'fd>,
        /// Allowed filesystem rights.
        access: AccessFs,
    },
    /// Access to a TCP port.
    NetPort {
        /// Port number.
        port: u64,
        /// Allowed network rights.
        access: AccessNet,
    },
}

/// Kernel primitives for Landlock self-sandboxing.
pub trait Kernel {
    /// Highest ABI version supported by the running kernel.
    ///
    /// # Errors
    ///
    /// Returns the raw `errno` of the probe.
    fn abi_version(&self) -> Result<u32, Errno>;

    /// Errata bitmask of the running kernel.
    ///
    /// # Errors
    ///
    /// Returns the raw `errno` of the probe.
    fn errata(&self) -> Result<u32, Errno>;

    /// Creates a ruleset handling the given rights.
    ///
    /// # Errors
    ///
    /// Returns the raw `errno` of `landlock_create_ruleset(2)`.
    fn create_ruleset(&self, attr: &RulesetAttrRaw, flags: CreateFlags) -> Result<OwnedFd, Errno>;

    /// Adds one rule to a ruleset.
    ///
    /// # Errors
    ///
    /// Returns the raw `errno` of `landlock_add_rule(2)`.
    fn add_rule(&self, ruleset: BorrowedFd<'_>, rule: &Rule<'_>) -> Result<(), Errno>;

    /// Restricts the calling thread with a ruleset. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns the raw `errno` of `landlock_restrict_self(2)`.
    fn restrict_self(&self, ruleset: BorrowedFd<'_>, flags: RestrictSelfFlags) -> Result<(), Errno>;

    /// Sets `no_new_privs` on the calling thread. Irreversible.
    ///
    /// # Errors
    ///
    /// Returns the raw `errno` of `prctl(PR_SET_NO_NEW_PRIVS)`.
    fn set_no_new_privs(&self) -> Result<(), Errno>;

    /// Whether the audit subsystem can receive Landlock denial logs.
    fn audit_available(&self) -> bool;
}

impl<K: Kernel + ?Sized> Kernel for &K {
    fn abi_version(&self) -> Result<u32, Errno> {
        (**self).abi_version()
    }

    fn errata(&self) -> Result<u32, Errno> {
        (**self).errata()
    }

    fn create_ruleset(&self, attr: &RulesetAttrRaw, flags: CreateFlags) -> Result<OwnedFd, Errno> {
        (**self).create_ruleset(attr, flags)
    }

    fn add_rule(&self, ruleset: BorrowedFd<'_>, rule: &Rule<'_>) -> Result<(), Errno> {
        (**self).add_rule(ruleset, rule)
    }

    fn restrict_self(&self, ruleset: BorrowedFd<'_>, flags: RestrictSelfFlags) -> Result<(), Errno> {
        (**self).restrict_self(ruleset, flags)
    }

    fn set_no_new_privs(&self) -> Result<(), Errno> {
        (**self).set_no_new_privs()
    }

    fn audit_available(&self) -> bool {
        (**self).audit_available()
    }
}

/// The running Linux kernel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Landlock;

#[cfg(target_os = "linux")]
mod linux {
    use std::os::fd::{AsRawFd, BorrowedFd, FromRawFd, OwnedFd, RawFd};

    use landrail_common::types::{CreateFlags, RestrictSelfFlags};
    use nix::errno::Errno;

    use super::{Kernel, Landlock, Rule, RulesetAttrRaw};

    const LANDLOCK_RULE_PATH_BENEATH: libc::c_int = 1;
    const LANDLOCK_RULE_NET_PORT: libc::c_int = 2;

    /// `struct landlock_path_beneath_attr` (packed in the UAPI header).
    #[repr(C, packed)]
    struct PathBeneathAttr {
        allowed_access: u64,
        parent_fd: i32,
    }

    /// `struct landlock_net_port_attr`.
    #[repr(C)]
    struct NetPortAttr {
        allowed_access: u64,
        port: u64,
    }

    fn check(ret: libc::c_long) -> Result<libc::c_long, Errno> {
        if ret < 0 { Err(Errno::last()) } else { Ok(ret) }
    }

    fn query(flags: CreateFlags) -> Result<u32, Errno> {
        // SAFETY: a null attribute with size 0 is the documented query form.
        let ret = unsafe {
            libc::syscall(
                libc::SYS_landlock_create_ruleset,
                std::ptr::null::<RulesetAttrRaw>(),
                0usize,
                flags.bits(),
            )
        };
        check(ret).map(|v| u32::try_from(v).unwrap_or(u32::MAX))
    }

    impl Kernel for Landlock {
        fn abi_version(&self) -> Result<u32, Errno> {
            query(CreateFlags::VERSION)
        }

        fn errata(&self) -> Result<u32, Errno> {
            query(CreateFlags::ERRATA)
        }

        fn create_ruleset(&self, attr: &RulesetAttrRaw, flags: CreateFlags) -> Result<OwnedFd, Errno> {
            // SAFETY: attr points to a live, correctly sized struct for the call.
            let ret = unsafe {
                libc::syscall(
                    libc::SYS_landlock_create_ruleset,
                    std::ptr::from_ref(attr),
                    size_of::<RulesetAttrRaw>(),
                    flags.bits(),
                )
            };
            let fd = RawFd::try_from(check(ret)?).map_err(|_| Errno::EBADF)?;
            // SAFETY: on success the kernel returns a fresh descriptor we now own.
            Ok(unsafe { OwnedFd::from_raw_fd(fd) })
        }

        fn add_rule(&self, ruleset: BorrowedFd<'_>, rule: &Rule<'_>) -> Result<(), Errno> {
            let ret = match *rule {
                Rule::PathBeneath { parent, access } => {
                    let attr = PathBeneathAttr {
                        allowed_access: access.bits(),
                        parent_fd: parent.as_raw_fd(),
                    };
                    // SAFETY: both descriptors are borrowed for the duration of
                    // the call and attr outlives it.
                    unsafe {
                        libc::syscall(
                            libc::SYS_landlock_add_rule,
                            ruleset.as_raw_fd(),
                            LANDLOCK_RULE_PATH_BENEATH,
                            std::ptr::from_ref(&attr),
                            0u32,
                        )
                    }
                }
                Rule::NetPort { port, access } => {
                    let attr = NetPortAttr {
                        allowed_access: access.bits(),
                        port,
                    };
                    // SAFETY: the ruleset descriptor is borrowed for the
                    // duration of the call and attr outlives it.
                    unsafe {
                        libc::syscall(
                            libc::SYS_landlock_add_rule,
                            ruleset.as_raw_fd(),
                            LANDLOCK_RULE_NET_PORT,
                            std::ptr::from_ref(&attr),
                            0u32,
                        )
                    }
                }
            };
            check(ret).map(drop)
        }

        fn restrict_self(&self, ruleset: BorrowedFd<'_>, flags: RestrictSelfFlags) -> Result<(), Errno> {
            // SAFETY: the ruleset descriptor is borrowed for the duration of the call.
            let ret = unsafe {
                libc::syscall(libc::SYS_landlock_restrict_self, ruleset.as_raw_fd(), flags.bits())
            };
            check(ret).map(drop)
        }

        fn set_no_new_privs(&self) -> Result<(), Errno> {
            nix::sys::prctl::set_no_new_privs()
        }

        fn audit_available(&self) -> bool {
            use nix::sys::socket::{AddressFamily, SockFlag, SockProtocol, SockType, socket};

            match socket(
                AddressFamily::Netlink,
                SockType::Raw,
                SockFlag::SOCK_CLOEXEC,
                SockProtocol::NetlinkAudit,
            ) {
                Ok(_fd) => true,
                Err(Errno::EPROTONOSUPPORT) => false,
                Err(errno) => {
                    // Only EPROTONOSUPPORT proves audit is missing; EACCES or
                    // EPERM may still hide an unavailable audit subsystem.
                    tracing::debug!(%errno, "audit probe failed, assuming audit is available");
                    true
                }
            }
        }
    }
}

#[cfg(not(target_os = "linux"))]
impl Kernel for Landlock {
    fn abi_version(&self) -> Result<u32, Errno> {
        Err(Errno::ENOSYS)
    }

    fn errata(&self) -> Result<u32, Errno> {
        Err(Errno::ENOSYS)
    }

    fn create_ruleset(&self, _attr: &RulesetAttrRaw, _flags: CreateFlags) -> Result<OwnedFd, Errno> {
        Err(Errno::ENOSYS)
    }

    fn add_rule(&self, _ruleset: BorrowedFd<'_>, _rule: &Rule<'_>) -> Result<(), Errno> {
        Err(Errno::ENOSYS)
    }

    fn restrict_self(&self, _ruleset: BorrowedFd<'_>, _flags: RestrictSelfFlags) -> Result<(), Errno> {
        Err(Errno::ENOSYS)
    }

    fn set_no_new_privs(&self) -> Result<(), Errno> {
        Err(Errno::ENOSYS)
    }

    fn audit_available(&self) -> bool {
        false
    }
}
