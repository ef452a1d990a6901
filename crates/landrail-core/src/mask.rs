//! Access rights supported by each Landlock ABI version.
//!
//! Every table lists `(minimum ABI, rights)` pairs; the rights supported at a
//! version are the union of all rows at or below it. Supporting a new kernel
//! feature means appending a row here and nothing else.

use landrail_common::types::{AbiVersion, AccessClass, AccessFs, AccessNet, RestrictSelfFlags, Scope};

const BASELINE_FS: AccessFs = AccessFs::EXECUTE
    .union(AccessFs::WRITE_FILE)
    .union(AccessFs::READ_FILE)
    .union(AccessFs::READ_DIR)
    .union(AccessFs::REMOVE_DIR)
    .union(AccessFs::REMOVE_FILE)
    .union(AccessFs::MAKE_CHAR)
    .union(AccessFs::MAKE_DIR)
    .union(AccessFs::MAKE_REG)
    .union(AccessFs::MAKE_SOCK)
    .union(AccessFs::MAKE_FIFO)
    .union(AccessFs::MAKE_BLOCK)
    .union(AccessFs::MAKE_SYM);

const FS_TABLE: &[(AbiVersion, AccessFs)] = &[
    (AbiVersion::V1, BASELINE_FS),
    (AbiVersion::V2, AccessFs::REFER),
    (AbiVersion::V3, AccessFs::TRUNCATE),
    (AbiVersion::V5, AccessFs::IOCTL_DEV),
];

const NET_TABLE: &[(AbiVersion, AccessNet)] = &[(
    AbiVersion::V4,
    AccessNet::BIND_TCP.union(AccessNet::CONNECT_TCP),
)];

const SCOPE_TABLE: &[(AbiVersion, Scope)] = &[(
    AbiVersion::V6,
    Scope::ABSTRACT_UNIX_SOCKET.union(Scope::SIGNAL),
)];

const RESTRICT_FLAGS_TABLE: &[(AbiVersion, RestrictSelfFlags)] = &[(
    AbiVersion::V7,
    RestrictSelfFlags::LOG_SAME_EXEC_OFF
        .union(RestrictSelfFlags::LOG_NEW_EXEC_ON)
        .union(RestrictSelfFlags::LOG_SUBDOMAINS_OFF),
)];

fn fold<T>(table: &[(AbiVersion, T)], abi: AbiVersion, empty: T) -> T
where
    T: Copy + std::ops::BitOr<Output = T>,
{
    table
        .iter()
        .filter(|(min, _)| abi >= *min)
        .fold(empty, |acc, (_, bits)| acc | *bits)
}

/// Filesystem rights supported at `abi`.
#[must_use]
pub fn supported_fs(abi: AbiVersion) -> AccessFs {
    fold(FS_TABLE, abi, AccessFs::empty())
}

/// Network rights supported at `abi`.
#[must_use]
pub fn supported_net(abi: AbiVersion) -> AccessNet {
    fold(NET_TABLE, abi, AccessNet::empty())
}

/// IPC scopes supported at `abi`.
#[must_use]
pub fn supported_scope(abi: AbiVersion) -> Scope {
    fold(SCOPE_TABLE, abi, Scope::empty())
}

/// Restrict-self flags supported at `abi`.
#[must_use]
pub fn supported_restrict_flags(abi: AbiVersion) -> RestrictSelfFlags {
    fold(RESTRICT_FLAGS_TABLE, abi, RestrictSelfFlags::empty())
}

/// Raw bits supported at `abi` for one access class.
#[must_use]
pub fn supported(class: AccessClass, abi: AbiVersion) -> u64 {
    match class {
        AccessClass::Filesystem => supported_fs(abi).bits(),
        AccessClass::Network => supported_net(abi).bits(),
        AccessClass::Scope => supported_scope(abi).bits(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERSIONS: std::ops::RangeInclusive<u32> = 0..=10;

    #[test]
    fn baseline_has_thirteen_rights() {
        assert_eq!(supported_fs(AbiVersion::V1).bits().count_ones(), 13);
        assert!(supported_fs(AbiVersion::V1).contains(AccessFs::MAKE_SYM));
        assert!(!supported_fs(AbiVersion::V1).contains(AccessFs::REFER));
    }

    #[test]
    fn fs_rights_appear_at_their_versions() {
        assert!(supported_fs(AbiVersion::V2).contains(AccessFs::REFER));
        assert!(!supported_fs(AbiVersion::V2).contains(AccessFs::TRUNCATE));
        assert!(supported_fs(AbiVersion::V3).contains(AccessFs::TRUNCATE));
        assert!(!supported_fs(AbiVersion::V4).contains(AccessFs::IOCTL_DEV));
        assert_eq!(supported_fs(AbiVersion::V5), AccessFs::all());
    }

    #[test]
    fn network_starts_at_v4() {
        assert!(supported_net(AbiVersion::V3).is_empty());
        assert_eq!(supported_net(AbiVersion::V4), AccessNet::all());
    }

    #[test]
    fn scope_starts_at_v6() {
        assert!(supported_scope(AbiVersion::V5).is_empty());
        assert_eq!(supported_scope(AbiVersion::V6), Scope::all());
    }

    #[test]
    fn restrict_flags_start_at_v7() {
        assert!(supported_restrict_flags(AbiVersion::V6).is_empty());
        assert_eq!(supported_restrict_flags(AbiVersion::V7), RestrictSelfFlags::all());
    }

    #[test]
    fn version_zero_supports_nothing() {
        let zero = AbiVersion::new(0);
        for class in AccessClass::ALL {
            assert_eq!(supported(class, zero), 0, "{class}");
        }
    }

    #[test]
    fn every_class_is_monotonic_in_abi() {
        for class in AccessClass::ALL {
            for v in VERSIONS {
                let lower = supported(class, AbiVersion::new(v));
                let higher = supported(class, AbiVersion::new(v + 1));
                assert_eq!(lower & higher, lower, "{class} shrinks from ABI {v} to {}", v + 1);
            }
        }
        for v in VERSIONS {
            let lower = supported_restrict_flags(AbiVersion::new(v));
            assert!(supported_restrict_flags(AbiVersion::new(v + 1)).contains(lower));
        }
    }
}
