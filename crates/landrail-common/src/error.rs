//! Closed error taxonomy shared by every landrail operation.
//!
//! Each fallible operation reports exactly one [`ErrorKind`]. The kinds are
//! grouped by the phase that produces them (generic, ruleset creation, rule
//! addition, restriction) and carry stable integer codes so they can cross
//! process or FFI boundaries unchanged.

use thiserror::Error;

/// Every failure a landrail operation can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
#[repr(i32)]
pub enum ErrorKind {
    /// System error not covered by Landlock semantics.
    #[error("system error")]
    System = -1,
    /// Invalid argument provided to the library.
    #[error("invalid argument")]
    InvalidArgument = -2,
    /// Out of memory.
    #[error("out of memory")]
    OutOfMemory = -3,
    /// Required syscall is not available.
    #[error("required syscall is not available")]
    UnsupportedSyscall = -5,
    /// Requested ABI is newer than the kernel's and the mode is strict.
    #[error("ruleset cannot be created due to compatibility checks")]
    RulesetIncompatible = -6,

    /// Landlock is supported by the kernel but disabled at boot time.
    #[error("landlock is supported by the kernel but disabled at boot time")]
    RulesetCreateDisabled = -100,
    /// Unknown flags, unknown access, or too small size.
    #[error("unknown flags, unknown access, or too small size")]
    RulesetCreateInvalid = -101,
    /// Attribute size is too big.
    #[error("ruleset attribute size is too big")]
    RulesetCreateSizeTooBig = -102,
    /// Attribute was not a valid address.
    #[error("ruleset attribute was not a valid address")]
    RulesetCreateBadAddress = -103,
    /// The ruleset would not restrict any access right.
    #[error("empty accesses: the ruleset does not restrict any access right")]
    RulesetCreateEmptyAccess = -104,

    /// Network rule requested but TCP is not supported by the ruleset or kernel.
    #[error("network port rule requested, but TCP is not supported")]
    AddRuleTcpUnsupported = -120,
    /// Landlock is supported by the kernel but disabled at boot time.
    #[error("landlock is supported by the kernel but disabled at boot time")]
    AddRuleDisabled = -121,
    /// Rule flags are not zero.
    #[error("rule flags must be 0")]
    AddRuleFlagsInvalid = -122,
    /// Rule accesses are not a subset of the ruleset's handled accesses.
    #[error("rule accesses are not a subset of the ruleset handled accesses")]
    AddRuleInconsistentAccess = -123,
    /// Directory-only rights requested on something that is not a directory.
    #[error("rule accesses are only applicable to directories, but the target is not one")]
    AddRuleAccessNotApplicable = -124,
    /// Port number is greater than 65535.
    #[error("port number is greater than 65535")]
    AddRulePortOutOfRange = -125,
    /// Rule grants no access right.
    #[error("empty accesses: the rule does not allow any access right")]
    AddRuleEmptyAccess = -126,
    /// Ruleset or rule target is not a valid file descriptor.
    #[error("ruleset or rule target is not a valid file descriptor")]
    AddRuleBadFd = -127,
    /// Ruleset or rule target is not the expected file descriptor type.
    #[error("ruleset or rule target is not the expected file descriptor type")]
    AddRuleBadFdType = -128,
    /// Ruleset descriptor has no write access to the underlying ruleset.
    #[error("ruleset has no write access to the underlying ruleset")]
    AddRuleNoWrite = -129,
    /// Rule attribute was not a valid address.
    #[error("rule attribute was not a valid address")]
    AddRuleBadAddress = -130,

    /// Landlock is supported by the kernel but disabled at boot time.
    #[error("landlock is supported by the kernel but disabled at boot time")]
    RestrictDisabled = -140,
    /// Restrict-self flags are not supported.
    #[error("restrict-self flags are not supported")]
    RestrictFlagsInvalid = -141,
    /// Ruleset is not a file descriptor for the current thread.
    #[error("ruleset is not a file descriptor for the current thread")]
    RestrictBadFd = -142,
    /// Ruleset descriptor is not a ruleset.
    #[error("ruleset descriptor is not a ruleset")]
    RestrictBadFdType = -143,
    /// No read access to the ruleset, no `no_new_privs`, or no `CAP_SYS_ADMIN`.
    #[error("restriction not permitted: missing ruleset read access, no_new_privs, or CAP_SYS_ADMIN")]
    RestrictNotPermitted = -144,
    /// The calling thread already carries the maximum number of composed rulesets.
    #[error("the maximum number of composed rulesets (64) is reached for the calling thread")]
    RestrictLimitReached = -145,
    /// Only a partial sandbox was possible and the mode is strict.
    #[error("sandbox would only be partially applied, which strict mode disallows")]
    PartialSandboxStrict = -146,
}

impl ErrorKind {
    const ALL: [Self; 28] = [
        Self::System,
        Self::InvalidArgument,
        Self::OutOfMemory,
        Self::UnsupportedSyscall,
        Self::RulesetIncompatible,
        Self::RulesetCreateDisabled,
        Self::RulesetCreateInvalid,
        Self::RulesetCreateSizeTooBig,
        Self::RulesetCreateBadAddress,
        Self::RulesetCreateEmptyAccess,
        Self::AddRuleTcpUnsupported,
        Self::AddRuleDisabled,
        Self::AddRuleFlagsInvalid,
        Self::AddRuleInconsistentAccess,
        Self::AddRuleAccessNotApplicable,
        Self::AddRulePortOutOfRange,
        Self::AddRuleEmptyAccess,
        Self::AddRuleBadFd,
        Self::AddRuleBadFdType,
        Self::AddRuleNoWrite,
        Self::AddRuleBadAddress,
        Self::RestrictDisabled,
        Self::RestrictFlagsInvalid,
        Self::RestrictBadFd,
        Self::RestrictBadFdType,
        Self::RestrictNotPermitted,
        Self::RestrictLimitReached,
        Self::PartialSandboxStrict,
    ];

    /// Returns the stable negative integer code of this kind.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    /// Looks up the kind for a stable integer code.
    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Returns `true` when the kind means Landlock cannot be used at all on
    /// this system (missing syscall, disabled at boot, or not permitted).
    #[must_use]
    pub const fn is_unsupported(self) -> bool {
        matches!(
            self,
            Self::UnsupportedSyscall
                | Self::RulesetCreateDisabled
                | Self::AddRuleDisabled
                | Self::RestrictDisabled
                | Self::RestrictNotPermitted
        )
    }
}

/// Successful outcome of an operation that may degrade in best-effort mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    /// Everything requested was applied.
    Ok = 0,
    /// Applied, but weaker than requested.
    OkPartialSandbox = 1,
}

impl Status {
    /// Returns `true` for [`Status::OkPartialSandbox`].
    #[must_use]
    pub const fn is_partial(self) -> bool {
        matches!(self, Self::OkPartialSandbox)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ok => write!(f, "success"),
            Self::OkPartialSandbox => {
                write!(f, "success, but only partial sandboxing was applied")
            }
        }
    }
}

/// Error returned by every fallible landrail operation.
///
/// Wraps exactly one [`ErrorKind`] and, when the failure came from the OS,
/// the underlying I/O error.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct LandrailError {
    kind: ErrorKind,
    #[source]
    source: Option<std::io::Error>,
}

impl LandrailError {
    /// Creates an error with no underlying OS cause.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Creates an error caused by an OS error.
    #[must_use]
    pub const fn with_source(kind: ErrorKind, source: std::io::Error) -> Self {
        Self {
            kind,
            source: Some(source),
        }
    }

    /// Creates an error caused by a raw `errno` value.
    #[must_use]
    pub fn from_raw_os_error(kind: ErrorKind, errno: i32) -> Self {
        Self::with_source(kind, std::io::Error::from_raw_os_error(errno))
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the raw OS error number, if the failure came from the OS.
    #[must_use]
    pub fn raw_os_error(&self) -> Option<i32> {
        self.source.as_ref().and_then(std::io::Error::raw_os_error)
    }
}

impl From<ErrorKind> for LandrailError {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, LandrailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip_through_lookup() {
        for kind in ErrorKind::ALL {
            assert_eq!(ErrorKind::from_code(kind.code()), Some(kind));
        }
    }

    #[test]
    fn unknown_code_has_no_kind() {
        assert_eq!(ErrorKind::from_code(0), None);
        assert_eq!(ErrorKind::from_code(-4), None);
        assert_eq!(ErrorKind::from_code(-999), None);
    }

    #[test]
    fn phase_codes_match_documented_values() {
        assert_eq!(ErrorKind::RulesetCreateDisabled.code(), -100);
        assert_eq!(ErrorKind::AddRuleTcpUnsupported.code(), -120);
        assert_eq!(ErrorKind::RestrictLimitReached.code(), -145);
        assert_eq!(ErrorKind::PartialSandboxStrict.code(), -146);
    }

    #[test]
    fn error_keeps_os_cause() {
        let err = LandrailError::from_raw_os_error(ErrorKind::System, 2);
        assert_eq!(err.kind(), ErrorKind::System);
        assert_eq!(err.raw_os_error(), Some(2));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn error_displays_kind_description() {
        let err = LandrailError::new(ErrorKind::AddRulePortOutOfRange);
        assert_eq!(err.to_string(), "port number is greater than 65535");
        assert!(err.raw_os_error().is_none());
    }

    #[test]
    fn partial_status_is_distinct_from_ok() {
        assert!(Status::OkPartialSandbox.is_partial());
        assert!(!Status::Ok.is_partial());
        assert_ne!(Status::Ok, Status::OkPartialSandbox);
    }
}
