//! # landrail-core
//!
//! Landlock policy negotiation for the landrail workspace.
//!
//! A caller describes the sandbox it wants with a [`RulesetAttr`], without
//! caring which Landlock ABI the running kernel implements. This crate:
//! - **Negotiates** the request against the kernel's ABI, in strict or
//!   best-effort mode, and creates the kernel ruleset.
//! - **Validates** path and port rules against the rights the ruleset
//!   committed to before submitting them.
//! - **Enforces** the ruleset on the calling thread, degrading unsupported
//!   restrict flags when allowed.
//!
//! Raw syscalls live behind the [`Kernel`] trait in [`sys`], with the only
//! `unsafe` code of the workspace.
//!
//! ```no_run
//! use landrail_common::types::{AccessFs, CompatMode, RequestedAbi, RestrictSelfFlags};
//! use landrail_core::RulesetAttr;
//!
//! # fn main() -> landrail_common::error::Result<()> {
//! let mut attr = RulesetAttr::new(RequestedAbi::Latest, CompatMode::BestEffort);
//! let _ = attr.handle_fs(AccessFs::READ_GROUP | AccessFs::WRITE_FILE);
//! let (ruleset, _) = attr.create()?;
//! ruleset.add_path("/usr", AccessFs::READ_GROUP, 0)?;
//! let _status = ruleset.enforce(RestrictSelfFlags::empty())?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod abi;
pub mod attr;
pub mod enforce;
pub mod mask;
pub mod policy;
pub mod rule;
pub mod ruleset;
pub mod sys;
#[cfg(test)]
pub(crate) mod testing;
pub mod translate;

pub use abi::{abi_version, errata};
pub use attr::{HandledAccess, RulesetAttr};
pub use policy::ApplyPolicy;
pub use ruleset::Ruleset;
pub use sys::{Kernel, Landlock};
