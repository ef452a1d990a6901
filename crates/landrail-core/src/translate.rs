//! Per-phase translation of raw `errno` values into [`ErrorKind`]s.
//!
//! The same `errno` means different things depending on which syscall
//! produced it (`EINVAL` is an invalid attribute at creation, an
//! inconsistent access when adding a rule, and unsupported flags when
//! restricting), so each phase has its own table.

use landrail_common::error::{ErrorKind, LandrailError};
use nix::errno::Errno;

/// Phase of the Landlock lifecycle a failure came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// ABI/errata probes and `landlock_create_ruleset(2)`.
    Create,
    /// `landlock_add_rule(2)`.
    AddRule,
    /// `landlock_restrict_self(2)`.
    Restrict,
}

/// Maps an `errno` from the given phase to its error kind.
#[must_use]
pub const fn kind_for(phase: Phase, errno: Errno) -> ErrorKind {
    match (phase, errno) {
        (_, Errno::ENOSYS) => ErrorKind::UnsupportedSyscall,
        (_, Errno::ENOMEM) => ErrorKind::OutOfMemory,

        (Phase::Create, Errno::EOPNOTSUPP) => ErrorKind::RulesetCreateDisabled,
        (Phase::Create, Errno::EINVAL) => ErrorKind::RulesetCreateInvalid,
        (Phase::Create, Errno::E2BIG) => ErrorKind::RulesetCreateSizeTooBig,
        (Phase::Create, Errno::EFAULT) => ErrorKind::RulesetCreateBadAddress,
        (Phase::Create, Errno::ENOMSG) => ErrorKind::RulesetCreateEmptyAccess,

        (Phase::AddRule, Errno::EAFNOSUPPORT) => ErrorKind::AddRuleTcpUnsupported,
        (Phase::AddRule, Errno::EOPNOTSUPP) => ErrorKind::AddRuleDisabled,
        (Phase::AddRule, Errno::EINVAL) => ErrorKind::AddRuleInconsistentAccess,
        (Phase::AddRule, Errno::ENOMSG) => ErrorKind::AddRuleEmptyAccess,
        (Phase::AddRule, Errno::EBADF) => ErrorKind::AddRuleBadFd,
        #[cfg(target_os = "linux")]
        (Phase::AddRule, Errno::EBADFD) => ErrorKind::AddRuleBadFdType,
        (Phase::AddRule, Errno::EPERM) => ErrorKind::AddRuleNoWrite,
        (Phase::AddRule, Errno::EFAULT) => ErrorKind::AddRuleBadAddress,

        (Phase::Restrict, Errno::EOPNOTSUPP) => ErrorKind::RestrictDisabled,
        (Phase::Restrict, Errno::EINVAL) => ErrorKind::RestrictFlagsInvalid,
        (Phase::Restrict, Errno::EBADF) => ErrorKind::RestrictBadFd,
        #[cfg(target_os = "linux")]
        (Phase::Restrict, Errno::EBADFD) => ErrorKind::RestrictBadFdType,
        (Phase::Restrict, Errno::EPERM) => ErrorKind::RestrictNotPermitted,
        (Phase::Restrict, Errno::E2BIG) => ErrorKind::RestrictLimitReached,

        _ => ErrorKind::System,
    }
}

/// Builds the error for an `errno` from the given phase, keeping the OS cause.
#[must_use]
pub fn error_for(phase: Phase, errno: Errno) -> LandrailError {
    LandrailError::from_raw_os_error(kind_for(phase, errno), errno as i32)
}

/// Builds a [`ErrorKind::System`] error for failures outside Landlock itself.
#[must_use]
pub fn system_error(errno: Errno) -> LandrailError {
    LandrailError::from_raw_os_error(ErrorKind::System, errno as i32)
}
