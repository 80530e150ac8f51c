//! In-memory user directory.

use async_trait::async_trait;

use crate::domain::ports::{UserDirectory, UserDirectoryError};
use crate::domain::{User, UserId, Username};

use super::MemoryStore;

/// Directory reading accounts from a [`MemoryStore`].
#[derive(Debug, Clone)]
pub struct MemoryUserDirectory {
    store: MemoryStore,
}

impl MemoryUserDirectory {
    pub(super) fn new(store: MemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserDirectoryError> {
        let state = self.store.lock().map_err(UserDirectoryError::query)?;
        Ok(state.users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &Username,
    ) -> Result<Option<User>, UserDirectoryError> {
        let state = self.store.lock().map_err(UserDirectoryError::query)?;
        Ok(state
            .users
            .values()
            .find(|user| user.username() == username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FIXTURE_STUDENT_TWO_ID;
    use rstest::rstest;

    #[rstest]
    #[tokio::test]
    async fn finds_seeded_accounts() {
        let directory = MemoryStore::with_fixture_accounts().user_directory();
        let student = directory
            .find_by_username(&Username::new("student2").expect("valid username"))
            .await
            .expect("lookup succeeds")
            .expect("student exists");
        assert_eq!(student.id(), &UserId::from_uuid(FIXTURE_STUDENT_TWO_ID));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_store_has_no_accounts() {
        let directory = MemoryStore::new().user_directory();
        let found = directory
            .find_by_id(&UserId::random())
            .await
            .expect("lookup succeeds");
        assert!(found.is_none());
    }
}
