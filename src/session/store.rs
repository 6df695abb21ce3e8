//! Session state with generation-gated commits.
//!
//! Readers get lock-free snapshots. Writers hold a ticket taken when their
//! operation started; a commit only lands if no intentional session change
//! (login, registration, logout) claimed a newer generation in the meantime.

use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::models::{TrialStatus, User, UserRole};

/// Point-in-time view of the session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub user: Option<User>,
    /// Only ever present for the gated role
    pub trial_status: Option<TrialStatus>,
    /// True until the startup identity fetch resolves
    pub is_loading: bool,
}

impl SessionSnapshot {
    pub fn loading() -> Self {
        Self {
            user: None,
            trial_status: None,
            is_loading: true,
        }
    }

    pub fn signed_out() -> Self {
        Self {
            user: None,
            trial_status: None,
            is_loading: false,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<UserRole> {
        self.user.as_ref().map(|u| u.role)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Ticket(u64);

/// Identity and trial snapshot fetched together.
#[derive(Debug, Clone)]
pub(crate) struct Identity {
    pub user: User,
    pub trial_status: Option<TrialStatus>,
}

pub(crate) struct SessionStore {
    snapshot: ArcSwap<SessionSnapshot>,
    generation: Mutex<u64>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            snapshot: ArcSwap::from_pointee(SessionSnapshot::loading()),
            generation: Mutex::new(0),
        }
    }

    pub fn load(&self) -> Arc<SessionSnapshot> {
        self.snapshot.load_full()
    }

    /// Observe the current generation without claiming it.
    pub fn ticket(&self) -> Ticket {
        Ticket(*self.generation.lock())
    }

    /// Start an intentional session change; older tickets stop committing.
    pub fn claim(&self) -> Ticket {
        let mut generation = self.generation.lock();
        *generation += 1;
        Ticket(*generation)
    }

    fn replace(&self, user: Option<User>, trial_status: Option<TrialStatus>) {
        let is_loading = self.snapshot.load().is_loading;
        self.snapshot.store(Arc::new(SessionSnapshot {
            user,
            trial_status,
            is_loading,
        }));
    }

    /// Store user and trial snapshot together if `ticket` is still current.
    pub fn commit_identity(&self, ticket: Ticket, identity: Identity) -> bool {
        let generation = self.generation.lock();
        if *generation != ticket.0 {
            return false;
        }
        let trial_status = identity
            .trial_status
            .filter(|_| identity.user.role.is_gated());
        self.replace(Some(identity.user), trial_status);
        true
    }

    /// Unconditionally sign out and invalidate every outstanding ticket.
    /// Returns the ticket of the signed-out generation.
    pub fn clear(&self) -> Ticket {
        let mut generation = self.generation.lock();
        *generation += 1;
        self.replace(None, None);
        Ticket(*generation)
    }

    /// Sign out only if nothing newer happened since `ticket`.
    pub fn clear_if_current(&self, ticket: Ticket) -> bool {
        let generation = self.generation.lock();
        if *generation != ticket.0 {
            return false;
        }
        self.replace(None, None);
        true
    }

    /// Swap in a new trial snapshot for the same gated user.
    pub fn replace_trial(
        &self,
        ticket: Ticket,
        user_id: i64,
        trial_status: Option<TrialStatus>,
    ) -> bool {
        let generation = self.generation.lock();
        if *generation != ticket.0 {
            return false;
        }
        let current = self.snapshot.load();
        match current.user.as_ref() {
            Some(user) if user.id == user_id && user.role.is_gated() => {
                self.replace(Some(user.clone()), trial_status);
                true
            }
            _ => false,
        }
    }

    /// Mark startup resolution. Returns false if it was already done.
    pub fn finish_loading(&self) -> bool {
        let _generation = self.generation.lock();
        let current = self.snapshot.load_full();
        if !current.is_loading {
            return false;
        }
        self.snapshot.store(Arc::new(SessionSnapshot {
            is_loading: false,
            ..(*current).clone()
        }));
        true
    }
}
