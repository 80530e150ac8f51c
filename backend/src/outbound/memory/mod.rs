//! In-process adapters sharing a single store.
//!
//! The catalogue, directory and ledger adapters all lock the same
//! [`std::sync::Mutex`], so every guarded write (capacity-checked insert,
//! capacity-checked course update, guarded delete) runs in one critical
//! section exactly like a transaction against the database adapter. The lock
//! is never held across an `.await`.

mod course_catalog;
mod registration_ledger;
mod user_directory;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::{
    Course, CourseId, Registration, RegistrationId, User, UserId, fixture_accounts,
};

pub use course_catalog::MemoryCourseCatalog;
pub use registration_ledger::MemoryRegistrationLedger;
pub use user_directory::MemoryUserDirectory;

#[derive(Debug, Default)]
pub(crate) struct State {
    pub(crate) users: HashMap<UserId, User>,
    pub(crate) courses: HashMap<CourseId, Course>,
    pub(crate) registrations: HashMap<RegistrationId, Registration>,
}

impl State {
    pub(crate) fn active_count(&self, course_id: CourseId) -> u64 {
        self.registrations
            .values()
            .filter(|registration| {
                registration.course_id() == course_id && registration.is_active()
            })
            .count() as u64
    }

    pub(crate) fn has_active_pair(&self, user_id: &UserId, course_id: CourseId) -> bool {
        self.registrations.values().any(|registration| {
            registration.user_id() == user_id
                && registration.course_id() == course_id
                && registration.is_active()
        })
    }
}

/// Shared handle to the in-memory store.
///
/// Cloning is cheap and every clone observes the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the development accounts.
    ///
    /// # Examples
    /// ```
    /// use registrar::outbound::memory::MemoryStore;
    ///
    /// let store = MemoryStore::with_fixture_accounts();
    /// assert_eq!(store.user_count(), 4);
    /// ```
    pub fn with_fixture_accounts() -> Self {
        let store = Self::new();
        for user in fixture_accounts() {
            store.insert_user(user);
        }
        store
    }

    /// Add or replace a directory account.
    pub fn insert_user(&self, user: User) {
        match self.state.lock() {
            Ok(mut state) => {
                state.users.insert(*user.id(), user);
            }
            Err(poisoned) => {
                poisoned.into_inner().users.insert(*user.id(), user);
            }
        }
    }

    pub fn user_count(&self) -> usize {
        match self.state.lock() {
            Ok(state) => state.users.len(),
            Err(poisoned) => poisoned.into_inner().users.len(),
        }
    }

    pub fn course_catalog(&self) -> MemoryCourseCatalog {
        MemoryCourseCatalog::new(self.clone())
    }

    pub fn user_directory(&self) -> MemoryUserDirectory {
        MemoryUserDirectory::new(self.clone())
    }

    pub fn registration_ledger(&self) -> MemoryRegistrationLedger {
        MemoryRegistrationLedger::new(self.clone())
    }

    /// Lock the shared state, reporting poisoning as a message.
    pub(crate) fn lock(&self) -> Result<MutexGuard<'_, State>, String> {
        self.state
            .lock()
            .map_err(|_| "in-memory store lock poisoned".to_owned())
    }
}
