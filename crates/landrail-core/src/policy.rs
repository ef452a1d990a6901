//! Building and enforcing a ruleset from a [`SandboxPolicy`].

use landrail_common::config::SandboxPolicy;
use landrail_common::constants::MAX_PORT;
use landrail_common::error::{ErrorKind, Result, Status};
use landrail_common::types::CompatMode;

use crate::attr::RulesetAttr;
use crate::ruleset::Ruleset;
use crate::sys::{Kernel, Landlock};

/// Turns a policy into a live sandbox.
///
/// In best-effort mode, grants are narrowed to the rights the ruleset
/// actually handles and grants left empty are skipped; the outcome is then
/// reported as [`Status::OkPartialSandbox`]. In strict mode every grant is
/// submitted as written.
pub trait ApplyPolicy {
    /// Creates the ruleset on a given kernel and adds every grant.
    ///
    /// # Errors
    ///
    /// Any creation or rule error.
    fn build_with<K: Kernel>(&self, kernel: K) -> Result<(Ruleset<K>, Status)>;

    /// Creates the ruleset on the running kernel and adds every grant.
    ///
    /// # Errors
    ///
    /// Any creation or rule error.
    fn build(&self) -> Result<(Ruleset, Status)> {
        self.build_with(Landlock)
    }

    /// Builds the ruleset on a given kernel and restricts the calling thread.
    ///
    /// # Errors
    ///
    /// Any creation, rule or restriction error.
    fn apply_with<K: Kernel>(&self, kernel: K) -> Result<Status>;

    /// Builds the ruleset and restricts the calling thread.
    ///
    /// # Errors
    ///
    /// Any creation, rule or restriction error.
    fn apply(&self) -> Result<Status> {
        self.apply_with(Landlock)
    }
}

impl ApplyPolicy for SandboxPolicy {
    fn build_with<K: Kernel>(&self, kernel: K) -> Result<(Ruleset<K>, Status)> {
        let mut attr = RulesetAttr::new(self.abi, self.compat);
        let _ = attr
            .handle_fs(self.handled_fs)
            .handle_net(self.handled_net)
            .handle_scope(self.scoped)
            .add_flags(self.create_flags);
        let (ruleset, mut status) = attr.create_with(kernel)?;
        let best_effort = self.compat == CompatMode::BestEffort;

        for grant in &self.paths {
            let access = if best_effort {
                grant.access & ruleset.handled_fs()
            } else {
                grant.access
            };
            if access.is_empty() {
                tracing::warn!(path = %grant.path.display(), "no handled right left, skipping path grant");
                status = Status::OkPartialSandbox;
                continue;
            }
            if access != grant.access {
                status = Status::OkPartialSandbox;
            }
            ruleset.add_path(&grant.path, access, 0)?;
        }

        for grant in &self.ports {
            if grant.port > MAX_PORT {
                return Err(ErrorKind::AddRulePortOutOfRange.into());
            }
            let access = if best_effort {
                grant.access & ruleset.handled_net()
            } else {
                grant.access
            };
            if access.is_empty() {
                tracing::warn!(port = grant.port, "no handled right left, skipping port grant");
                status = Status::OkPartialSandbox;
                continue;
            }
            if access != grant.access {
                status = Status::OkPartialSandbox;
            }
            ruleset.add_net_port(grant.port, access, 0)?;
        }

        tracing::debug!(
            paths = self.paths.len(),
            ports = self.ports.len(),
            %status,
            "policy ruleset built"
        );
        Ok((ruleset, status))
    }

    fn apply_with<K: Kernel>(&self, kernel: K) -> Result<Status> {
        let (ruleset, built) = self.build_with(kernel)?;
        let enforced = ruleset.enforce(self.restrict_flags)?;
        if built.is_partial() || enforced.is_partial() {
            Ok(Status::OkPartialSandbox)
        } else {
            Ok(Status::Ok)
        }
    }
}
