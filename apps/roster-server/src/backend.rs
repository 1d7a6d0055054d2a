use std::sync::Arc;

use roster_storage::*;
use roster_store_postgres::PostgresStore;
use roster_store_sqlite::SqliteStore;

/// StoreBackend abstracts over SQLite and PostgreSQL implementations
#[derive(Clone)]
pub enum StoreBackend {
    Sqlite(Arc<SqliteStore>),
    Postgres(Arc<PostgresStore>),
}

impl StoreBackend {
    /// Open the backend named by the URL scheme. Anything but `postgres:` is SQLite.
    pub async fn open(db_url: &str) -> Result<Self, StoreError> {
        if db_url.starts_with("postgres:") {
            Ok(StoreBackend::Postgres(Arc::new(PostgresStore::open(db_url).await?)))
        } else {
            Ok(StoreBackend::Sqlite(Arc::new(SqliteStore::open(db_url).await?)))
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            StoreBackend::Sqlite(_) => "sqlite",
            StoreBackend::Postgres(_) => "postgres",
        }
    }
}

#[async_trait::async_trait]
impl Store for StoreBackend {
    async fn get_user_id_by_mail_and_password(
        &self,
        mail: &str,
        password_hash: &str,
    ) -> Result<UserId, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_user_id_by_mail_and_password(mail, password_hash).await,
            StoreBackend::Postgres(s) => {
                s.get_user_id_by_mail_and_password(mail, password_hash).await
            }
        }
    }

    async fn list_users(&self, limit: u32, offset: u32) -> Result<Vec<UserSummary>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.list_users(limit, offset).await,
            StoreBackend::Postgres(s) => s.list_users(limit, offset).await,
        }
    }

    async fn get_user(&self, user_id: &UserId) -> Result<UserSummary, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_user(user_id).await,
            StoreBackend::Postgres(s) => s.get_user(user_id).await,
        }
    }

    async fn get_users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserSummary>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_users_by_ids(user_ids).await,
            StoreBackend::Postgres(s) => s.get_users_by_ids(user_ids).await,
        }
    }

    async fn get_searched_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<Vec<SearchedUser>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_searched_users(user_ids).await,
            StoreBackend::Postgres(s) => s.get_searched_users(user_ids).await,
        }
    }

    async fn search_user_ids(
        &self,
        field: SearchField,
        keyword: &str,
    ) -> Result<Vec<UserId>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.search_user_ids(field, keyword).await,
            StoreBackend::Postgres(s) => s.search_user_ids(field, keyword).await,
        }
    }

    async fn get_user_for_filter(&self, user_id: &UserId) -> Result<UserForFilter, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_user_for_filter(user_id).await,
            StoreBackend::Postgres(s) => s.get_user_for_filter(user_id).await,
        }
    }

    async fn find_department_id_by_name(&self, name: &str) -> Result<DepartmentId, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.find_department_id_by_name(name).await,
            StoreBackend::Postgres(s) => s.find_department_id_by_name(name).await,
        }
    }

    async fn get_office_id_of_user(&self, user_id: &UserId) -> Result<OfficeId, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.get_office_id_of_user(user_id).await,
            StoreBackend::Postgres(s) => s.get_office_id_of_user(user_id).await,
        }
    }

    async fn find_skill_ids_by_names(&self, names: &[String]) -> Result<Vec<SkillId>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.find_skill_ids_by_names(names).await,
            StoreBackend::Postgres(s) => s.find_skill_ids_by_names(names).await,
        }
    }

    async fn list_match_partners(&self, user_id: &UserId) -> Result<Vec<UserId>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.list_match_partners(user_id).await,
            StoreBackend::Postgres(s) => s.list_match_partners(user_id).await,
        }
    }

    async fn find_candidate_ids(&self, query: &CandidateQuery) -> Result<Vec<UserId>, StoreError> {
        match self {
            StoreBackend::Sqlite(s) => s.find_candidate_ids(query).await,
            StoreBackend::Postgres(s) => s.find_candidate_ids(query).await,
        }
    }
}
