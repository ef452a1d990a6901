//! Irreversible self-restriction.

use std::os::fd::AsFd;

use landrail_common::error::{ErrorKind, Result, Status};
use landrail_common::types::{CompatMode, RestrictSelfFlags};

use crate::mask::supported_restrict_flags;
use crate::ruleset::Ruleset;
use crate::sys::Kernel;
use crate::translate::{Phase, error_for, system_error};

const LOGGING_FLAGS: RestrictSelfFlags = RestrictSelfFlags::all();

impl<K: Kernel> Ruleset<K> {
    /// Restricts the calling thread, and every child it spawns afterwards,
    /// to this ruleset.
    ///
    /// Flags unsupported at the ruleset's ABI, and logging flags when the
    /// audit subsystem is missing, are dropped in best-effort mode; the
    /// result is then [`Status::OkPartialSandbox`].
    ///
    /// # Errors
    ///
    /// - `RestrictFlagsInvalid` for undefined flag bits;
    /// - `PartialSandboxStrict` in strict mode when a flag must be dropped;
    /// - `System` when `no_new_privs` cannot be set;
    /// - a restriction error when the kernel refuses, including
    ///   `RestrictLimitReached` past the composition limit.
    pub fn enforce(&self, flags: RestrictSelfFlags) -> Result<Status> {
        if RestrictSelfFlags::from_bits(flags.bits()).is_none() {
            return Err(ErrorKind::RestrictFlagsInvalid.into());
        }

        let mut masked = flags & supported_restrict_flags(self.abi);
        let mut status = self.compat.negotiate(&flags, &masked)?;

        if masked.intersects(LOGGING_FLAGS) && !self.kernel.audit_available() {
            match self.compat {
                CompatMode::Strict => return Err(ErrorKind::PartialSandboxStrict.into()),
                CompatMode::BestEffort => {
                    tracing::warn!(flags = ?masked, "audit unavailable, dropping logging flags");
                    masked -= LOGGING_FLAGS;
                    status = Status::OkPartialSandbox;
                }
            }
        }

        self.kernel.set_no_new_privs().map_err(system_error)?;
        self.kernel
            .restrict_self(self.fd.as_fd(), masked)
            .map_err(|errno| error_for(Phase::Restrict, errno))?;

        tracing::info!(abi = %self.abi, flags = ?masked, %status, "landlock ruleset enforced");
        Ok(status)
    }
}
