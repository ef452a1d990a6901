//! Ruleset creation and ABI negotiation.
//!
//! [`RulesetAttr::create`] turns a caller's request into a kernel ruleset.
//! The rights it commits are the request intersected with what the
//! effective ABI supports; those committed masks then bound every rule
//! added and are fixed for the ruleset's lifetime.

use std::os::fd::{AsFd, BorrowedFd, OwnedFd};

use landrail_common::error::{ErrorKind, Result, Status};
use landrail_common::types::{AbiVersion, AccessFs, AccessNet, CompatMode, Scope};

use crate::abi::{probe_abi, resolve};
use crate::attr::{HandledAccess, RulesetAttr};
use crate::mask;
use crate::sys::{Kernel, Landlock};
use crate::translate::{Phase, error_for};

/// A kernel ruleset with its committed masks.
///
/// The handle is released exactly once, when the ruleset is dropped or
/// [closed](Ruleset::close).
#[derive(Debug)]
pub struct Ruleset<K: Kernel = Landlock> {
    pub(crate) fd: OwnedFd,
    pub(crate) kernel: K,
    pub(crate) abi: AbiVersion,
    pub(crate) compat: CompatMode,
    pub(crate) handled: HandledAccess,
    pub(crate) status: Status,
}

impl RulesetAttr {
    /// Creates a ruleset on the running kernel.
    ///
    /// # Errors
    ///
    /// See [`RulesetAttr::create_with`].
    pub fn create(self) -> Result<(Ruleset, Status)> {
        self.create_with(Landlock)
    }

    /// Creates a ruleset through the given kernel.
    ///
    /// The status is [`Status::OkPartialSandbox`] when best-effort mode
    /// dropped requested rights the kernel does not support.
    ///
    /// # Errors
    ///
    /// - a creation error when the kernel cannot be probed or refuses the ruleset;
    /// - `RulesetIncompatible` in strict mode when the kernel is older than requested;
    /// - `RulesetCreateEmptyAccess` when no supported right remains;
    /// - `PartialSandboxStrict` in strict mode when a requested right is unsupported.
    pub fn create_with<K: Kernel>(self, kernel: K) -> Result<(Ruleset<K>, Status)> {
        let current = probe_abi(&kernel)?;
        let requested = resolve(&kernel, self.abi);

        let abi = if current >= requested {
            requested
        } else {
            match self.compat {
                CompatMode::Strict => {
                    tracing::debug!(%current, %requested, "kernel older than requested ABI");
                    return Err(ErrorKind::RulesetIncompatible.into());
                }
                CompatMode::BestEffort => {
                    tracing::warn!(%current, %requested, "downgrading to kernel ABI");
                    current
                }
            }
        };

        let supported = HandledAccess {
            fs: mask::supported_fs(abi),
            net: mask::supported_net(abi),
            scope: mask::supported_scope(abi),
        };
        let handled = self.handled.intersection(supported);
        if handled.is_empty() {
            return Err(ErrorKind::RulesetCreateEmptyAccess.into());
        }

        let fd = kernel
            .create_ruleset(&handled.to_raw(), self.flags)
            .map_err(|errno| error_for(Phase::Create, errno))?;

        let status = match self.compat.negotiate(&self.handled, &handled) {
            Ok(status) => status,
            Err(err) => {
                tracing::debug!(
                    requested = ?self.handled,
                    supported = ?handled,
                    "strict mode refused unsupported rights, releasing ruleset"
                );
                drop(fd);
                return Err(err);
            }
        };

        if status.is_partial() {
            tracing::warn!(
                %abi,
                dropped_fs = ?(self.handled.fs - handled.fs),
                dropped_net = ?(self.handled.net - handled.net),
                dropped_scope = ?(self.handled.scope - handled.scope),
                "partial sandbox: kernel lacks some requested rights"
            );
        }
        tracing::info!(
            %abi,
            compat = %self.compat,
            fs = ?handled.fs,
            net = ?handled.net,
            scope = ?handled.scope,
            "created landlock ruleset"
        );

        let ruleset = Ruleset {
            fd,
            kernel,
            abi,
            compat: self.compat,
            handled,
            status,
        };
        Ok((ruleset, status))
    }
}

impl<K: Kernel> Ruleset<K> {
    /// Effective ABI the ruleset was negotiated at.
    #[must_use]
    pub const fn abi(&self) -> AbiVersion {
        self.abi
    }

    /// Compatibility mode inherited from the attributes.
    #[must_use]
    pub const fn compat_mode(&self) -> CompatMode {
        self.compat
    }

    /// Committed filesystem rights.
    #[must_use]
    pub const fn handled_fs(&self) -> AccessFs {
        self.handled.fs
    }

    /// Committed network rights.
    #[must_use]
    pub const fn handled_net(&self) -> AccessNet {
        self.handled.net
    }

    /// Committed IPC scopes.
    #[must_use]
    pub const fn scoped(&self) -> Scope {
        self.handled.scope
    }

    /// Outcome of creation.
    #[must_use]
    pub const fn status(&self) -> Status {
        self.status
    }

    /// Releases the kernel handle.
    pub fn close(self) {
        tracing::debug!(abi = %self.abi, "closing landlock ruleset");
    }
}

impl<K: Kernel> AsFd for Ruleset<K> {
    fn as_fd(&self) -> BorrowedFd<'_> {
        self.fd.as_fd()
    }
}
