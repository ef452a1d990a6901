//! Scriptable in-memory kernel for negotiation tests.

use std::cell::{Cell, RefCell};
use std::io::Read;
use std::os::fd::{BorrowedFd, OwnedFd};
use std::os::unix::net::UnixStream;

use landrail_common::constants::MAX_COMPOSED_RULESETS;
use landrail_common::types::{AccessFs, AccessNet, CreateFlags, RestrictSelfFlags};
use nix::errno::Errno;

use crate::sys::{Kernel, Rule, RulesetAttrRaw};

/// A rule as the fake kernel received it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordedRule {
    PathBeneath(AccessFs),
    NetPort(u64, AccessNet),
}

/// Kernel double recording every call. Failures are injected per channel.
#[derive(Debug)]
pub struct FakeKernel {
    pub abi: Result<u32, Errno>,
    pub errata: Result<u32, Errno>,
    pub create_error: Option<Errno>,
    pub add_rule_error: Option<Errno>,
    pub restrict_error: Option<Errno>,
    pub no_new_privs_error: Option<Errno>,
    pub audit: bool,
    pub created: RefCell<Vec<(RulesetAttrRaw, CreateFlags)>>,
    pub rules: RefCell<Vec<RecordedRule>>,
    pub restrictions: RefCell<Vec<RestrictSelfFlags>>,
    pub no_new_privs: Cell<bool>,
    peers: RefCell<Vec<UnixStream>>,
}

impl FakeKernel {
    pub fn with_abi(abi: u32) -> Self {
        Self {
            abi: Ok(abi),
            errata: Ok(0),
            create_error: None,
            add_rule_error: None,
            restrict_error: None,
            no_new_privs_error: None,
            audit: true,
            created: RefCell::default(),
            rules: RefCell::default(),
            restrictions: RefCell::default(),
            no_new_privs: Cell::new(false),
            peers: RefCell::default(),
        }
    }

    pub fn without_landlock(errno: Errno) -> Self {
        Self {
            abi: Err(errno),
            errata: Err(errno),
            create_error: Some(errno),
            ..Self::with_abi(0)
        }
    }

    /// Number of ruleset handles handed out and not yet closed.
    pub fn live_handles(&self) -> usize {
        self.peers
            .borrow()
            .iter()
            .filter(|peer| {
                let mut buf = [0u8; 1];
                let mut stream: &UnixStream = peer;
                // A closed counterpart reads as EOF; an open one would block.
                !matches!(stream.read(&mut buf), Ok(0))
            })
            .count()
    }
}

impl Kernel for FakeKernel {
    fn abi_version(&self) -> Result<u32, Errno> {
        self.abi
    }

    fn errata(&self) -> Result<u32, Errno> {
        self.errata
    }

    fn create_ruleset(&self, attr: &RulesetAttrRaw, flags: CreateFlags) -> Result<OwnedFd, Errno> {
        if let Some(errno) = self.create_error {
            return Err(errno);
        }
        self.created.borrow_mut().push((*attr, flags));
        let (handle, peer) = UnixStream::pair().map_err(|_| Errno::EMFILE)?;
        peer.set_nonblocking(true).map_err(|_| Errno::EIO)?;
        self.peers.borrow_mut().push(peer);
        Ok(OwnedFd::from(handle))
    }

    fn add_rule(&self, _ruleset: BorrowedFd<'_>, rule: &Rule<'_>) -> Result<(), Errno> {
        if let Some(errno) = self.add_rule_error {
            return Err(errno);
        }
        let recorded = match *rule {
            Rule::PathBeneath { access, .. } => RecordedRule::PathBeneath(access),
            Rule::NetPort { port, access } => RecordedRule::NetPort(port, access),
        };
        self.rules.borrow_mut().push(recorded);
        Ok(())
    }

    fn restrict_self(&self, _ruleset: BorrowedFd<'_>, flags: RestrictSelfFlags) -> Result<(), Errno> {
        if let Some(errno) = self.restrict_error {
            return Err(errno);
        }
        if !self.no_new_privs.get() {
            return Err(Errno::EPERM);
        }
        let mut restrictions = self.restrictions.borrow_mut();
        if restrictions.len() >= MAX_COMPOSED_RULESETS {
            return Err(Errno::E2BIG);
        }
        restrictions.push(flags);
        Ok(())
    }

    fn set_no_new_privs(&self) -> Result<(), Errno> {
        if let Some(errno) = self.no_new_privs_error {
            return Err(errno);
        }
        self.no_new_privs.set(true);
        Ok(())
    }

    fn audit_available(&self) -> bool {
        self.audit
    }
}
