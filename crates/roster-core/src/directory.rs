//! User directory: login lookup, listings and keyword search.

use std::sync::Arc;

use roster_storage::{
    SearchField, SearchedUser, Store, StoreError, UserForFilter, UserId, UserSummary,
};
use tracing::debug;

use crate::validation::{is_kana, MailKeywordRule};
use crate::DirectoryError;

/// Largest page `list_users` returns unless configured otherwise.
pub const DEFAULT_MAX_PAGE_SIZE: u32 = 100;

pub struct Directory<S: ?Sized> {
    store: Arc<S>,
    mail_rule: MailKeywordRule,
    max_page_size: u32,
}

/// Map `NotFound` to `None`.
fn optional<T>(result: Result<T, StoreError>) -> Result<Option<T>, DirectoryError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(StoreError::NotFound) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl<S: Store + ?Sized> Directory<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            mail_rule: MailKeywordRule::default(),
            max_page_size: DEFAULT_MAX_PAGE_SIZE,
        }
    }

    pub fn with_mail_rule(mut self, mail_rule: MailKeywordRule) -> Self {
        self.mail_rule = mail_rule;
        self
    }

    pub fn with_max_page_size(mut self, max_page_size: u32) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    /// Find the user with this mail and password hash.
    pub async fn authenticate(
        &self,
        mail: &str,
        password_hash: &str,
    ) -> Result<Option<UserId>, DirectoryError> {
        optional(
            self.store
                .get_user_id_by_mail_and_password(mail, password_hash)
                .await,
        )
    }

    /// A page of users, oldest entry first. `limit` is capped at the max page size.
    pub async fn list_users(
        &self,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<UserSummary>, DirectoryError> {
        let limit = limit.min(self.max_page_size);
        if limit == 0 {
            return Ok(Vec::new());
        }
        Ok(self.store.list_users(limit, offset).await?)
    }

    pub async fn get_user(&self, user_id: &UserId) -> Result<Option<UserSummary>, DirectoryError> {
        optional(self.store.get_user(user_id).await)
    }

    pub async fn users_by_ids(
        &self,
        user_ids: &[UserId],
    ) -> Result<Vec<UserSummary>, DirectoryError> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.get_users_by_ids(user_ids).await?)
    }

    pub async fn user_for_filter(
        &self,
        user_id: &UserId,
    ) -> Result<Option<UserForFilter>, DirectoryError> {
        optional(self.store.get_user_for_filter(user_id).await)
    }

    /// Search users by one field.
    ///
    /// Empty keywords, non-kana keywords for [`SearchField::Kana`] and mail
    /// keywords outside the allowed characters match nobody.
    pub async fn search(
        &self,
        field: SearchField,
        keyword: &str,
    ) -> Result<Vec<SearchedUser>, DirectoryError> {
        if keyword.is_empty() {
            return Ok(Vec::new());
        }
        let accepted = match field {
            SearchField::Kana => is_kana(keyword),
            SearchField::Mail => self.mail_rule.is_valid(keyword),
            _ => true,
        };
        if !accepted {
            debug!(%field, "rejected search keyword");
            return Ok(Vec::new());
        }

        let user_ids = self.store.search_user_ids(field, keyword).await?;
        debug!(%field, hits = user_ids.len(), "searched users");
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self.store.get_searched_users(&user_ids).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use roster_storage::MockStore;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_rejected_keywords_skip_the_store() {
        let mut store = MockStore::new();
        store.expect_search_user_ids().never();
        let directory = Directory::new(Arc::new(store));

        assert!(directory.search(SearchField::Name, "").await.unwrap().is_empty());
        assert!(directory
            .search(SearchField::Kana, "yamada")
            .await
            .unwrap()
            .is_empty());
        assert!(directory
            .search(SearchField::Mail, "zed@example.com")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_search_fetches_hits_in_order() {
        let first = UserId(Uuid::new_v4());
        let second = UserId(Uuid::new_v4());
        let hits = vec![first.clone(), second.clone()];

        let mut store = MockStore::new();
        store
            .expect_search_user_ids()
            .with(eq(SearchField::Kana), eq("やま"))
            .returning(move |_, _| Ok(hits.clone()));
        store
            .expect_get_searched_users()
            .withf(move |ids| ids == [first.clone(), second.clone()])
            .returning(|_| Ok(vec![]));

        let directory = Directory::new(Arc::new(store));
        directory.search(SearchField::Kana, "やま").await.unwrap();
    }

    #[tokio::test]
    async fn test_no_hits_skips_user_fetch() {
        let mut store = MockStore::new();
        store.expect_search_user_ids().returning(|_, _| Ok(vec![]));
        store.expect_get_searched_users().never();

        let directory = Directory::new(Arc::new(store));
        assert!(directory
            .search(SearchField::Goal, "rust")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn test_list_users_caps_limit() {
        let mut store = MockStore::new();
        store
            .expect_list_users()
            .with(eq(10u32), eq(20u32))
            .returning(|_, _| Ok(vec![]));

        let directory = Directory::new(Arc::new(store)).with_max_page_size(10);
        directory.list_users(500, 20).await.unwrap();
        assert!(directory.list_users(0, 0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_user_is_none() {
        let mut store = MockStore::new();
        store
            .expect_get_user()
            .returning(|_| Err(StoreError::NotFound));
        store
            .expect_get_user_id_by_mail_and_password()
            .returning(|_, _| Err(StoreError::Backend("down".to_string())));

        let directory = Directory::new(Arc::new(store));
        assert!(directory
            .get_user(&UserId(Uuid::new_v4()))
            .await
            .unwrap()
            .is_none());
        assert!(matches!(
            directory.authenticate("a@example.com", "x").await,
            Err(DirectoryError::Store(StoreError::Backend(_)))
        ));
    }
}
