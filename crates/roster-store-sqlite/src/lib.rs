use std::collections::HashMap;

use chrono::NaiveDate;
use roster_storage::{
    contains_pattern, CandidateClause, CandidateQuery, DepartmentId, FileId, FileRef, OfficeId,
    SearchField, SearchedUser, SkillId, Store, StoreError, UserForFilter, UserId, UserSummary,
};
use sqlx::{sqlite::SqlitePoolOptions, QueryBuilder, Sqlite, SqlitePool};
use uuid::Uuid;

pub mod seed;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const SUMMARY_SELECT: &str = r#"SELECT u.user_id, u.user_name, u.user_icon_id, f.file_name, o.office_name
FROM "user" AS u
  INNER JOIN office AS o ON u.office_id = o.office_id
  INNER JOIN file AS f ON u.user_icon_id = f.file_id"#;

const SEARCHED_SELECT: &str = r#"SELECT u.user_id, u.user_name, u.kana, u.entry_date, o.office_name, u.user_icon_id, f.file_name
FROM "user" AS u
  INNER JOIN office AS o ON u.office_id = o.office_id
  INNER JOIN file AS f ON u.user_icon_id = f.file_id"#;

type SummaryRow = (String, String, String, String, String);
type SearchedRow = (String, String, String, NaiveDate, String, String, String);

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }

    /// Writer for populating the directory tables.
    pub fn seed(&self) -> seed::Seeder<'_> {
        seed::Seeder::new(&self.pool)
    }
}

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(|e| StoreError::InvalidData(e.to_string()))
}

fn parse_user_ids(rows: Vec<(String,)>) -> Result<Vec<UserId>, StoreError> {
    rows.into_iter()
        .map(|(id,)| parse_uuid(&id).map(UserId))
        .collect()
}

fn summary_from_row(row: SummaryRow) -> Result<UserSummary, StoreError> {
    let (user_id, user_name, icon_id, file_name, office_name) = row;
    Ok(UserSummary {
        user_id: UserId(parse_uuid(&user_id)?),
        user_name,
        user_icon: FileRef {
            file_id: FileId(parse_uuid(&icon_id)?),
            file_name,
        },
        office_name,
    })
}

fn searched_from_row(row: SearchedRow) -> Result<SearchedUser, StoreError> {
    let (user_id, user_name, kana, entry_date, office_name, icon_id, file_name) = row;
    Ok(SearchedUser {
        user_id: UserId(parse_uuid(&user_id)?),
        user_name,
        kana,
        entry_date,
        office_name,
        user_icon: FileRef {
            file_id: FileId(parse_uuid(&icon_id)?),
            file_name,
        },
    })
}

/// Append `(SELECT value FROM json_each(?))` with the list bound as one JSON array.
///
/// A single parameter keeps long lists clear of SQLite's host parameter limit.
fn push_id_list(qb: &mut QueryBuilder<'_, Sqlite>, ids: impl IntoIterator<Item = String>) {
    let array = serde_json::Value::from(ids.into_iter().collect::<Vec<String>>());
    qb.push("(SELECT value FROM json_each(");
    qb.push_bind(array.to_string());
    qb.push("))");
}

fn push_candidate_clause(qb: &mut QueryBuilder<'_, Sqlite>, clause: &CandidateClause) {
    match clause {
        CandidateClause::CurrentlyInDepartment(department_id) => {
            qb.push(
                " AND EXISTS (SELECT 1 FROM department_role_member AS drm \
                 WHERE drm.user_id = u.user_id AND drm.belong = 1 AND drm.department_id = ",
            );
            qb.push_bind(department_id.0.to_string());
            qb.push(")");
        }
        CandidateClause::NotInDepartment(department_id) => {
            qb.push(
                " AND EXISTS (SELECT 1 FROM department_role_member AS drm \
                 WHERE drm.user_id = u.user_id AND drm.belong = 1 AND drm.department_id <> ",
            );
            qb.push_bind(department_id.0.to_string());
            qb.push(
                ") AND NOT EXISTS (SELECT 1 FROM department_role_member AS drm \
                 WHERE drm.user_id = u.user_id AND drm.belong = 1 AND drm.department_id = ",
            );
            qb.push_bind(department_id.0.to_string());
            qb.push(")");
        }
        CandidateClause::InOffice(office_id) => {
            qb.push(" AND u.office_id = ");
            qb.push_bind(office_id.0.to_string());
        }
        CandidateClause::NotInOffice(office_id) => {
            qb.push(" AND u.office_id <> ");
            qb.push_bind(office_id.0.to_string());
        }
        CandidateClause::HasAnySkill(skill_ids) if skill_ids.is_empty() => {
            qb.push(" AND 1 = 0");
        }
        CandidateClause::HasAnySkill(skill_ids) => {
            qb.push(
                " AND EXISTS (SELECT 1 FROM skill_member AS sm \
                 WHERE sm.user_id = u.user_id AND sm.skill_id IN ",
            );
            push_id_list(qb, skill_ids.iter().map(|id| id.0.to_string()));
            qb.push(")");
        }
        CandidateClause::NotAmong(user_ids) if user_ids.is_empty() => {}
        CandidateClause::NotAmong(user_ids) => {
            qb.push(" AND u.user_id NOT IN ");
            push_id_list(qb, user_ids.iter().map(|id| id.0.to_string()));
        }
    }
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ───────────────────────────── Directory ─────────────────────────────

    async fn get_user_id_by_mail_and_password(
        &self,
        mail: &str,
        password_hash: &str,
    ) -> Result<UserId, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as(r#"SELECT user_id FROM "user" WHERE mail = ? AND password = ?"#)
                .bind(mail)
                .bind(password_hash)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            Some((id,)) => Ok(UserId(parse_uuid(&id)?)),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_users(&self, limit: u32, offset: u32) -> Result<Vec<UserSummary>, StoreError> {
        let sql = format!(
            "{} ORDER BY u.entry_date ASC, u.kana ASC LIMIT ? OFFSET ?",
            SUMMARY_SELECT
        );
        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(summary_from_row).collect()
    }

    async fn get_user(&self, user_id: &UserId) -> Result<UserSummary, StoreError> {
        let sql = format!("{} WHERE u.user_id = ?", SUMMARY_SELECT);
        let row = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(user_id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .ok_or(StoreError::NotFound)?;

        summary_from_row(row)
    }

    async fn get_users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserSummary>, StoreError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(SUMMARY_SELECT);
        qb.push(" WHERE u.user_id IN ");
        push_id_list(&mut qb, user_ids.iter().map(|id| id.0.to_string()));
        qb.push(" ORDER BY u.entry_date ASC, u.kana ASC");

        let rows = qb
            .build_query_as::<SummaryRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(summary_from_row).collect()
    }

    async fn get_searched_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<Vec<SearchedUser>, StoreError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(SEARCHED_SELECT);
        qb.push(" WHERE u.user_id IN ");
        push_id_list(&mut qb, user_ids.iter().map(|id| id.0.to_string()));

        let rows = qb
            .build_query_as::<SearchedRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in rows {
            let user = searched_from_row(row)?;
            by_id.insert(user.user_id.clone(), user);
        }

        // keep the caller's order (search relevance)
        Ok(user_ids.iter().filter_map(|id| by_id.remove(id)).collect())
    }

    async fn search_user_ids(
        &self,
        field: SearchField,
        keyword: &str,
    ) -> Result<Vec<UserId>, StoreError> {
        let sql = match field {
            SearchField::Name => {
                r#"SELECT user_id FROM "user" WHERE user_name LIKE ? ESCAPE '\' ORDER BY entry_date ASC, kana ASC"#
            }
            SearchField::Kana => {
                r#"SELECT user_id FROM "user" WHERE kana LIKE ? ESCAPE '\' ORDER BY entry_date ASC, kana ASC"#
            }
            SearchField::Mail => {
                r#"SELECT user_id FROM "user" WHERE mail LIKE ? ESCAPE '\' ORDER BY entry_date ASC, kana ASC"#
            }
            SearchField::Goal => {
                r#"SELECT user_id FROM "user" WHERE goal LIKE ? ESCAPE '\' ORDER BY entry_date ASC, kana ASC"#
            }
            SearchField::Department => {
                r#"SELECT DISTINCT drm.user_id
                   FROM department_role_member AS drm
                     INNER JOIN department AS d ON d.department_id = drm.department_id
                   WHERE d.department_name LIKE ? ESCAPE '\' AND d.active = 1 AND drm.belong = 1
                   ORDER BY drm.user_id"#
            }
            SearchField::Role => {
                r#"SELECT DISTINCT drm.user_id
                   FROM department_role_member AS drm
                     INNER JOIN role AS r ON r.role_id = drm.role_id
                   WHERE r.role_name LIKE ? ESCAPE '\' AND r.active = 1 AND drm.belong = 1
                   ORDER BY drm.user_id"#
            }
            SearchField::Office => {
                r#"SELECT u.user_id
                   FROM "user" AS u
                     INNER JOIN office AS o ON o.office_id = u.office_id
                   WHERE o.office_name LIKE ? ESCAPE '\'
                   ORDER BY u.entry_date ASC, u.kana ASC"#
            }
            SearchField::Skill => {
                r#"SELECT DISTINCT sm.user_id
                   FROM skill_member AS sm
                     INNER JOIN skill AS s ON s.skill_id = sm.skill_id
                   WHERE s.skill_name LIKE ? ESCAPE '\'
                   ORDER BY sm.user_id"#
            }
        };

        let rows = sqlx::query_as::<_, (String,)>(sql)
            .bind(contains_pattern(keyword))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        parse_user_ids(rows)
    }

    async fn get_user_for_filter(&self, user_id: &UserId) -> Result<UserForFilter, StoreError> {
        let summary = self.get_user(user_id).await?;

        let department: Option<(String,)> = sqlx::query_as(
            "SELECT d.department_name
             FROM department_role_member AS drm
               INNER JOIN department AS d ON d.department_id = drm.department_id
             WHERE drm.user_id = ? AND drm.belong = 1
             ORDER BY drm.entry_date DESC
             LIMIT 1",
        )
        .bind(user_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let skills: Vec<(String,)> = sqlx::query_as(
            "SELECT s.skill_name
             FROM skill AS s
               INNER JOIN skill_member AS sm ON sm.skill_id = s.skill_id
             WHERE sm.user_id = ?
             ORDER BY s.skill_name",
        )
        .bind(user_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(UserForFilter {
            user_id: summary.user_id,
            user_name: summary.user_name,
            office_name: summary.office_name,
            user_icon: summary.user_icon,
            department_name: department.map(|(name,)| name),
            skill_names: skills.into_iter().map(|(name,)| name).collect(),
        })
    }

    // ───────────────────────────── Matching ──────────────────────────────

    async fn find_department_id_by_name(&self, name: &str) -> Result<DepartmentId, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT department_id FROM department WHERE department_name = ? LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            Some((id,)) => Ok(DepartmentId(parse_uuid(&id)?)),
            None => Err(StoreError::NotFound),
        }
    }

    async fn get_office_id_of_user(&self, user_id: &UserId) -> Result<OfficeId, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as(r#"SELECT office_id FROM "user" WHERE user_id = ?"#)
                .bind(user_id.0.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            Some((id,)) => Ok(OfficeId(parse_uuid(&id)?)),
            None => Err(StoreError::NotFound),
        }
    }

    async fn find_skill_ids_by_names(&self, names: &[String]) -> Result<Vec<SkillId>, StoreError> {
        if names.is_empty() {
            return Ok(vec![]);
        }

        let mut qb = QueryBuilder::<Sqlite>::new("SELECT skill_id FROM skill WHERE skill_name IN ");
        push_id_list(&mut qb, names.iter().cloned());

        let rows = qb
            .build_query_as::<(String,)>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter()
            .map(|(id,)| parse_uuid(&id).map(SkillId))
            .collect()
    }

    async fn list_match_partners(&self, user_id: &UserId) -> Result<Vec<UserId>, StoreError> {
        let rows = sqlx::query_as::<_, (String,)>(
            "SELECT DISTINCT user_id
             FROM match_group_member
             WHERE match_group_id IN (SELECT match_group_id FROM match_group_member WHERE user_id = ?)",
        )
        .bind(user_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        parse_user_ids(rows)
    }

    async fn find_candidate_ids(&self, query: &CandidateQuery) -> Result<Vec<UserId>, StoreError> {
        if query.is_unsatisfiable() {
            return Ok(vec![]);
        }

        let mut qb = QueryBuilder::<Sqlite>::new(r#"SELECT u.user_id FROM "user" AS u WHERE 1 = 1"#);
        for clause in query.clauses() {
            push_candidate_clause(&mut qb, clause);
        }

        let rows = qb
            .build_query_as::<(String,)>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        parse_user_ids(rows)
    }
}
