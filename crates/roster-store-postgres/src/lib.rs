use std::collections::HashMap;

use chrono::NaiveDate;
use roster_storage::{
    contains_pattern, CandidateClause, CandidateQuery, DepartmentId, FileId, FileRef, OfficeId,
    SearchField, SearchedUser, SkillId, Store, StoreError, UserForFilter, UserId, UserSummary,
};
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

const SUMMARY_SELECT: &str = r#"SELECT u.user_id, u.user_name, u.user_icon_id, f.file_name, o.office_name
FROM "user" AS u
  INNER JOIN office AS o ON u.office_id = o.office_id
  INNER JOIN file AS f ON u.user_icon_id = f.file_id"#;

type SummaryRow = (Uuid, String, Uuid, String, String);
type SearchedRow = (Uuid, String, String, NaiveDate, String, Uuid, String);

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

fn summary_from_row((user_id, user_name, icon_id, file_name, office_name): SummaryRow) -> UserSummary {
    UserSummary {
        user_id: UserId(user_id),
        user_name,
        user_icon: FileRef {
            file_id: FileId(icon_id),
            file_name,
        },
        office_name,
    }
}

fn push_candidate_clause(qb: &mut QueryBuilder<'_, Postgres>, clause: &CandidateClause) {
    match clause {
        CandidateClause::CurrentlyInDepartment(department_id) => {
            qb.push(
                " AND EXISTS (SELECT 1 FROM department_role_member AS drm \
                 WHERE drm.user_id = u.user_id AND drm.belong AND drm.department_id = ",
            );
            qb.push_bind(department_id.0);
            qb.push(")");
        }
        CandidateClause::NotInDepartment(department_id) => {
            qb.push(
                " AND EXISTS (SELECT 1 FROM department_role_member AS drm \
                 WHERE drm.user_id = u.user_id AND drm.belong AND drm.department_id <> ",
            );
            qb.push_bind(department_id.0);
            qb.push(
                ") AND NOT EXISTS (SELECT 1 FROM department_role_member AS drm \
                 WHERE drm.user_id = u.user_id AND drm.belong AND drm.department_id = ",
            );
            qb.push_bind(department_id.0);
            qb.push(")");
        }
        CandidateClause::InOffice(office_id) => {
            qb.push(" AND u.office_id = ");
            qb.push_bind(office_id.0);
        }
        CandidateClause::NotInOffice(office_id) => {
            qb.push(" AND u.office_id <> ");
            qb.push_bind(office_id.0);
        }
        CandidateClause::HasAnySkill(skill_ids) if skill_ids.is_empty() => {
            qb.push(" AND FALSE");
        }
        CandidateClause::HasAnySkill(skill_ids) => {
            qb.push(
                " AND EXISTS (SELECT 1 FROM skill_member AS sm \
                 WHERE sm.user_id = u.user_id AND sm.skill_id = ANY(",
            );
            qb.push_bind(skill_ids.iter().map(|id| id.0).collect::<Vec<Uuid>>());
            qb.push("))");
        }
        CandidateClause::NotAmong(user_ids) if user_ids.is_empty() => {}
        CandidateClause::NotAmong(user_ids) => {
            qb.push(" AND u.user_id <> ALL(");
            qb.push_bind(user_ids.iter().map(|id| id.0).collect::<Vec<Uuid>>());
            qb.push(")");
        }
    }
}

#[async_trait::async_trait]
impl Store for PostgresStore {
    // ───────────────────────────── Directory ─────────────────────────────

    async fn get_user_id_by_mail_and_password(
        &self,
        mail: &str,
        password_hash: &str,
    ) -> Result<UserId, StoreError> {
        let row: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT user_id FROM "user" WHERE mail = $1 AND password = $2"#)
                .bind(mail)
                .bind(password_hash)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(|(id,)| UserId(id)).ok_or(StoreError::NotFound)
    }

    async fn list_users(&self, limit: u32, offset: u32) -> Result<Vec<UserSummary>, StoreError> {
        let sql = format!(
            "{} ORDER BY u.entry_date ASC, u.kana ASC LIMIT $1 OFFSET $2",
            SUMMARY_SELECT
        );
        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(i64::from(limit))
            .bind(i64::from(offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(summary_from_row).collect())
    }

    async fn get_user(&self, user_id: &UserId) -> Result<UserSummary, StoreError> {
        let sql = format!("{} WHERE u.user_id = $1", SUMMARY_SELECT);
        let row = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?
            .ok_or(StoreError::NotFound)?;

        Ok(summary_from_row(row))
    }

    async fn get_users_by_ids(&self, user_ids: &[UserId]) -> Result<Vec<UserSummary>, StoreError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let sql = format!(
            "{} WHERE u.user_id = ANY($1) ORDER BY u.entry_date ASC, u.kana ASC",
            SUMMARY_SELECT
        );
        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(user_ids.iter().map(|id| id.0).collect::<Vec<Uuid>>())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(summary_from_row).collect())
    }

    async fn get_searched_users(
        &self,
        user_ids: &[UserId],
    ) -> Result<Vec<SearchedUser>, StoreError> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let rows = sqlx::query_as::<_, SearchedRow>(
            r#"SELECT u.user_id, u.user_name, u.kana, u.entry_date, o.office_name, u.user_icon_id, f.file_name
               FROM "user" AS u
                 INNER JOIN office AS o ON u.office_id = o.office_id
                 INNER JOIN file AS f ON u.user_icon_id = f.file_id
               WHERE u.user_id = ANY($1)"#,
        )
        .bind(user_ids.iter().map(|id| id.0).collect::<Vec<Uuid>>())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let mut by_id: HashMap<Uuid, SearchedUser> = rows
            .into_iter()
            .map(
                |(user_id, user_name, kana, entry_date, office_name, icon_id, file_name)| {
                    (
                        user_id,
                        SearchedUser {
                            user_id: UserId(user_id),
                            user_name,
                            kana,
                            entry_date,
                            office_name,
                            user_icon: FileRef {
                                file_id: FileId(icon_id),
                                file_name,
                            },
                        },
                    )
                },
            )
            .collect();

        // keep the caller's order (search relevance)
        Ok(user_ids.iter().filter_map(|id| by_id.remove(&id.0)).collect())
    }

    async fn search_user_ids(
        &self,
        field: SearchField,
        keyword: &str,
    ) -> Result<Vec<UserId>, StoreError> {
        let (sql, param) = match field {
            SearchField::Name => (
                r#"SELECT user_id FROM "user" WHERE user_name ILIKE $1 ESCAPE '\' ORDER BY entry_date ASC, kana ASC"#,
                contains_pattern(keyword),
            ),
            SearchField::Kana => (
                r#"SELECT user_id FROM "user" WHERE kana LIKE $1 ESCAPE '\' ORDER BY entry_date ASC, kana ASC"#,
                contains_pattern(keyword),
            ),
            SearchField::Mail => (
                r#"SELECT user_id FROM "user" WHERE mail LIKE $1 ESCAPE '\' ORDER BY entry_date ASC, kana ASC"#,
                contains_pattern(keyword),
            ),
            SearchField::Goal => (
                r#"SELECT user_id FROM "user"
                   WHERE to_tsvector('simple', goal) @@ websearch_to_tsquery('simple', $1)
                   ORDER BY ts_rank(to_tsvector('simple', goal), websearch_to_tsquery('simple', $1)) DESC,
                            entry_date ASC"#,
                keyword.to_string(),
            ),
            SearchField::Department => (
                r#"SELECT DISTINCT drm.user_id
                   FROM department_role_member AS drm
                     INNER JOIN department AS d ON d.department_id = drm.department_id
                   WHERE d.department_name ILIKE $1 ESCAPE '\' AND d.active AND drm.belong
                   ORDER BY drm.user_id"#,
                contains_pattern(keyword),
            ),
            SearchField::Role => (
                r#"SELECT DISTINCT drm.user_id
                   FROM department_role_member AS drm
                     INNER JOIN role AS r ON r.role_id = drm.role_id
                   WHERE r.role_name ILIKE $1 ESCAPE '\' AND r.active AND drm.belong
                   ORDER BY drm.user_id"#,
                contains_pattern(keyword),
            ),
            SearchField::Office => (
                r#"SELECT u.user_id
                   FROM "user" AS u
                     INNER JOIN office AS o ON o.office_id = u.office_id
                   WHERE o.office_name ILIKE $1 ESCAPE '\'
                   ORDER BY u.entry_date ASC, u.kana ASC"#,
                contains_pattern(keyword),
            ),
            SearchField::Skill => (
                r#"SELECT DISTINCT sm.user_id
                   FROM skill_member AS sm
                     INNER JOIN skill AS s ON s.skill_id = sm.skill_id
                   WHERE s.skill_name ILIKE $1 ESCAPE '\'
                   ORDER BY sm.user_id"#,
                contains_pattern(keyword),
            ),
        };

        let rows = sqlx::query_as::<_, (Uuid,)>(sql)
            .bind(param)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(|(id,)| UserId(id)).collect())
    }

    async fn get_user_for_filter(&self, user_id: &UserId) -> Result<UserForFilter, StoreError> {
        let summary = self.get_user(user_id).await?;

        let department: Option<(String,)> = sqlx::query_as(
            "SELECT d.department_name
             FROM department_role_member AS drm
               INNER JOIN department AS d ON d.department_id = drm.department_id
             WHERE drm.user_id = $1 AND drm.belong
             ORDER BY drm.entry_date DESC
             LIMIT 1",
        )
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        let skills: Vec<(String,)> = sqlx::query_as(
            "SELECT s.skill_name
             FROM skill AS s
               INNER JOIN skill_member AS sm ON sm.skill_id = s.skill_id
             WHERE sm.user_id = $1
             ORDER BY s.skill_name",
        )
        .bind(user_id.0)
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
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT department_id FROM department WHERE department_name = $1 LIMIT 1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(|(id,)| DepartmentId(id)).ok_or(StoreError::NotFound)
    }

    async fn get_office_id_of_user(&self, user_id: &UserId) -> Result<OfficeId, StoreError> {
        let row: Option<(Uuid,)> =
            sqlx::query_as(r#"SELECT office_id FROM "user" WHERE user_id = $1"#)
                .bind(user_id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;

        row.map(|(id,)| OfficeId(id)).ok_or(StoreError::NotFound)
    }

    async fn find_skill_ids_by_names(&self, names: &[String]) -> Result<Vec<SkillId>, StoreError> {
        if names.is_empty() {
            return Ok(vec![]);
        }

        let rows = sqlx::query_as::<_, (Uuid,)>("SELECT skill_id FROM skill WHERE skill_name = ANY($1)")
            .bind(names.to_vec())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(|(id,)| SkillId(id)).collect())
    }

    async fn list_match_partners(&self, user_id: &UserId) -> Result<Vec<UserId>, StoreError> {
        let rows = sqlx::query_as::<_, (Uuid,)>(
            "SELECT DISTINCT user_id
             FROM match_group_member
             WHERE match_group_id IN (SELECT match_group_id FROM match_group_member WHERE user_id = $1)",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(|(id,)| UserId(id)).collect())
    }

    async fn find_candidate_ids(&self, query: &CandidateQuery) -> Result<Vec<UserId>, StoreError> {
        if query.is_unsatisfiable() {
            return Ok(vec![]);
        }

        let mut qb =
            QueryBuilder::<Postgres>::new(r#"SELECT u.user_id FROM "user" AS u WHERE TRUE"#);
        for clause in query.clauses() {
            push_candidate_clause(&mut qb, clause);
        }

        let rows = qb
            .build_query_as::<(Uuid,)>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(rows.into_iter().map(|(id,)| UserId(id)).collect())
    }
}
