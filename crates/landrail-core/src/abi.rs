//! Kernel ABI probing and resolution of `Latest` requests.

use landrail_common::constants::FALLBACK_ABI;
use landrail_common::error::Result;
use landrail_common::types::{AbiVersion, RequestedAbi};

use crate::sys::{Kernel, Landlock};
use crate::translate::{Phase, error_for};

/// Probes the highest ABI version supported by the kernel.
///
/// # Errors
///
/// Returns a ruleset-creation error (disabled, unsupported syscall, ...)
/// when the probe fails.
pub fn probe_abi(kernel: &impl Kernel) -> Result<AbiVersion> {
    let abi = kernel
        .abi_version()
        .map(AbiVersion::new)
        .map_err(|errno| error_for(Phase::Create, errno))?;
    tracing::debug!(%abi, "probed landlock ABI");
    Ok(abi)
}

/// Probes the kernel's errata bitmask.
///
/// # Errors
///
/// Fails exactly like [`probe_abi`].
pub fn probe_errata(kernel: &impl Kernel) -> Result<u32> {
    let errata = kernel
        .errata()
        .map_err(|errno| error_for(Phase::Create, errno))?;
    tracing::debug!(errata, "probed landlock errata");
    Ok(errata)
}

/// Resolves a requested ABI to a concrete version.
///
/// `Latest` becomes the kernel's version, or the pre-versioning baseline when
/// the kernel cannot be probed. Exact versions pass through unchanged; they
/// are checked against the kernel at ruleset creation.
pub fn resolve(kernel: &impl Kernel, requested: RequestedAbi) -> AbiVersion {
    match requested {
        RequestedAbi::Exact(version) => version,
        RequestedAbi::Latest => kernel.abi_version().map_or_else(
            |errno| {
                tracing::debug!(%errno, fallback = %FALLBACK_ABI, "ABI probe failed");
                FALLBACK_ABI
            },
            AbiVersion::new,
        ),
    }
}

/// Highest ABI version supported by the running kernel.
///
/// # Errors
///
/// See [`probe_abi`].
pub fn abi_version() -> Result<AbiVersion> {
    probe_abi(&Landlock)
}

/// Errata bitmask of the running kernel.
///
/// # Errors
///
/// See [`probe_errata`].
pub fn errata() -> Result<u32> {
    probe_errata(&Landlock)
}
