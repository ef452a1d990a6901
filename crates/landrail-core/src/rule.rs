//! Validation and submission of rules against a ruleset's committed masks.

use std::fs::OpenOptions;
use std::os::fd::{AsFd, BorrowedFd};
use std::os::unix::fs::OpenOptionsExt;
use std::path::Path;

use landrail_common::constants::MAX_PORT;
use landrail_common::error::{ErrorKind, LandrailError, Result};
use landrail_common::types::{AccessFs, AccessNet};
use nix::sys::stat::fstat;

use crate::ruleset::Ruleset;
use crate::sys::{Kernel, Rule};
use crate::translate::{Phase, error_for, system_error};

impl<K: Kernel> Ruleset<K> {
    /// Grants `access` beneath `path`.
    ///
    /// # Errors
    ///
    /// Returns `System` when `path` cannot be opened, otherwise fails like
    /// [`Ruleset::add_path_fd`].
    pub fn add_path(&self, path: impl AsRef<Path>, access: AccessFs, flags: u32) -> Result<()> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .read(true)
            .custom_flags(libc::O_PATH | libc::O_CLOEXEC)
            .open(path)
            .map_err(|e| LandrailError::with_source(ErrorKind::System, e))?;
        tracing::debug!(path = %path.display(), ?access, "adding path rule");
        self.add_path_fd(&file, access, flags)
    }

    /// Grants `access` beneath an already opened file or directory.
    ///
    /// # Errors
    ///
    /// - `AddRuleFlagsInvalid` for non-zero `flags`;
    /// - `AddRuleEmptyAccess` for an empty `access`;
    /// - `AddRuleInconsistentAccess` when `access` is not handled by the ruleset;
    /// - `AddRuleAccessNotApplicable` for directory rights on a non-directory;
    /// - an add-rule error when the kernel refuses the rule.
    pub fn add_path_fd(&self, fd: impl AsFd, access: AccessFs, flags: u32) -> Result<()> {
        if flags != 0 {
            return Err(ErrorKind::AddRuleFlagsInvalid.into());
        }
        if access.is_empty() {
            return Err(ErrorKind::AddRuleEmptyAccess.into());
        }
        if !self.handled.fs.contains(access) {
            tracing::debug!(?access, handled = ?self.handled.fs, "path access not handled");
            return Err(ErrorKind::AddRuleInconsistentAccess.into());
        }
        let parent = fd.as_fd();
        if access.intersects(AccessFs::DIR_ONLY) && !is_dir(parent)? {
            return Err(ErrorKind::AddRuleAccessNotApplicable.into());
        }

        self.kernel
            .add_rule(self.fd.as_fd(), &Rule::PathBeneath { parent, access })
            .map_err(|errno| error_for(Phase::AddRule, errno))
    }

    /// Grants `access` on a TCP port.
    ///
    /// # Errors
    ///
    /// - `AddRuleFlagsInvalid` for non-zero `flags`;
    /// - `AddRuleEmptyAccess` for an empty `access`;
    /// - `AddRulePortOutOfRange` for ports above 65535;
    /// - `AddRuleTcpUnsupported` when the ruleset handles no network right;
    /// - `AddRuleInconsistentAccess` when `access` is not handled by the ruleset;
    /// - an add-rule error when the kernel refuses the rule.
    pub fn add_net_port(&self, port: u64, access: AccessNet, flags: u32) -> Result<()> {
        if flags != 0 {
            return Err(ErrorKind::AddRuleFlagsInvalid.into());
        }
        if access.is_empty() {
            return Err(ErrorKind::AddRuleEmptyAccess.into());
        }
        if port > MAX_PORT {
            return Err(ErrorKind::AddRulePortOutOfRange.into());
        }
        if self.handled.net.is_empty() {
            return Err(ErrorKind::AddRuleTcpUnsupported.into());
        }
        if !self.handled.net.contains(access) {
            return Err(ErrorKind::AddRuleInconsistentAccess.into());
        }

        tracing::debug!(port, ?access, "adding port rule");
        self.kernel
            .add_rule(self.fd.as_fd(), &Rule::NetPort { port, access })
            .map_err(|errno| error_for(Phase::AddRule, errno))
    }
}

fn is_dir(fd: BorrowedFd<'_>) -> Result<bool> {
    let stat = fstat(fd).map_err(system_error)?;
    Ok((stat.st_mode & libc::S_IFMT) == libc::S_IFDIR)
}
