//! Kernel limits and well-known values.

/// Highest TCP port number a net-port rule may carry.
pub const MAX_PORT: u64 = 65_535;

/// Maximum number of rulesets that can be composed on one thread.
pub const MAX_COMPOSED_RULESETS: usize = 64;

/// ABI assumed when the kernel cannot be probed for `Latest`.
pub const FALLBACK_ABI: crate::types::AbiVersion = crate::types::AbiVersion::V1;
