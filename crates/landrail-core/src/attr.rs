//! Pending ruleset attributes, accumulated before negotiation.
//!
//! Nothing here is checked against the kernel: which rights are supported
//! depends on the effective ABI, known only when the ruleset is created.

use landrail_common::error::Result;
use landrail_common::types::{
    AccessClass, AccessFs, AccessNet, CompatMode, CreateFlags, RequestedAbi, Scope,
};

use crate::sys::RulesetAttrRaw;

/// Per-class access masks of a ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandledAccess {
    /// Filesystem rights.
    pub fs: AccessFs,
    /// Network rights.
    pub net: AccessNet,
    /// IPC scopes.
    pub scope: Scope,
}

impl HandledAccess {
    /// No right in any class.
    pub const EMPTY: Self = Self {
        fs: AccessFs::empty(),
        net: AccessNet::empty(),
        scope: Scope::empty(),
    };

    /// Returns `true` when no class holds any right.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.fs.is_empty() && self.net.is_empty() && self.scope.is_empty()
    }

    /// Raw bits of one class.
    #[must_use]
    pub const fn bits(&self, class: AccessClass) -> u64 {
        match class {
            AccessClass::Filesystem => self.fs.bits(),
            AccessClass::Network => self.net.bits(),
            AccessClass::Scope => self.scope.bits(),
        }
    }

    /// Per-class intersection.
    #[must_use]
    pub fn intersection(self, other: Self) -> Self {
        Self {
            fs: self.fs & other.fs,
            net: self.net & other.net,
            scope: self.scope & other.scope,
        }
    }

    pub(crate) const fn to_raw(self) -> RulesetAttrRaw {
        RulesetAttrRaw {
            handled_access_fs: self.fs.bits(),
            handled_access_net: self.net.bits(),
            scoped: self.scope.bits(),
        }
    }
}

impl Default for HandledAccess {
    fn default() -> Self {
        Self::EMPTY
    }
}

/// Caller's desired ruleset, independent of what the kernel supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulesetAttr {
    pub(crate) abi: RequestedAbi,
    pub(crate) compat: CompatMode,
    pub(crate) handled: HandledAccess,
    pub(crate) flags: CreateFlags,
}

impl RulesetAttr {
    /// Starts an attribute set with every class empty.
    #[must_use]
    pub const fn new(abi: RequestedAbi, compat: CompatMode) -> Self {
        Self {
            abi,
            compat,
            handled: HandledAccess::EMPTY,
            flags: CreateFlags::empty(),
        }
    }

    /// Adds rights to the given class. Unknown bits are kept and later
    /// dropped by negotiation.
    pub fn handle(&mut self, class: AccessClass, bits: u64) -> &mut Self {
        match class {
            AccessClass::Filesystem => self.handled.fs |= AccessFs::from_bits_retain(bits),
            AccessClass::Network => self.handled.net |= AccessNet::from_bits_retain(bits),
            AccessClass::Scope => self.handled.scope |= Scope::from_bits_retain(bits),
        }
        self
    }

    /// Like [`RulesetAttr::handle`], for a class given by its raw discriminant.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unrecognized class.
    pub fn handle_raw(&mut self, class: u32, bits: u64) -> Result<&mut Self> {
        let class = AccessClass::try_from(class)?;
        Ok(self.handle(class, bits))
    }

    /// Adds filesystem rights.
    pub fn handle_fs(&mut self, access: AccessFs) -> &mut Self {
        self.handle(AccessClass::Filesystem, access.bits())
    }

    /// Adds network rights.
    pub fn handle_net(&mut self, access: AccessNet) -> &mut Self {
        self.handle(AccessClass::Network, access.bits())
    }

    /// Adds IPC scopes.
    pub fn handle_scope(&mut self, scope: Scope) -> &mut Self {
        self.handle(AccessClass::Scope, scope.bits())
    }

    /// Adds ruleset creation flags.
    pub fn add_flags(&mut self, flags: CreateFlags) -> &mut Self {
        self.flags |= flags;
        self
    }

    /// Requested ABI.
    #[must_use]
    pub const fn abi(&self) -> RequestedAbi {
        self.abi
    }

    /// Compatibility mode.
    #[must_use]
    pub const fn compat_mode(&self) -> CompatMode {
        self.compat
    }

    /// Rights requested so far.
    #[must_use]
    pub const fn handled(&self) -> HandledAccess {
        self.handled
    }

    /// Creation flags requested so far.
    #[must_use]
    pub const fn flags(&self) -> CreateFlags {
        self.flags
    }
}

impl Default for RulesetAttr {
    fn default() -> Self {
        Self::new(RequestedAbi::Latest, CompatMode::BestEffort)
    }
}
