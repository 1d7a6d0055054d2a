//! Inserts for populating a SQLite directory (tests, local demos).
//!
//! The [`Store`](roster_storage::Store) trait is read-only; rows are written here.

use chrono::NaiveDate;
use roster_storage::{
    DepartmentId, FileId, MatchGroupId, OfficeId, RoleId, SkillId, StoreError, UserId,
};
use sqlx::SqlitePool;
use uuid::Uuid;

/// Parameters for inserting a user
#[derive(Clone, Debug)]
pub struct NewUser {
    pub user_name: String,
    pub kana: String,
    pub mail: String,
    pub password_hash: String,
    pub entry_date: NaiveDate,
    pub office_id: OfficeId,
    pub user_icon_id: FileId,
    pub goal: String,
}

pub struct Seeder<'a> {
    pool: &'a SqlitePool,
}

impl<'a> Seeder<'a> {
    pub(crate) fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn office(&self, name: &str) -> Result<OfficeId, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO office(office_id, office_name) VALUES(?, ?)")
            .bind(id.to_string())
            .bind(name)
            .execute(self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(OfficeId(id))
    }

    pub async fn file(&self, name: &str) -> Result<FileId, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO file(file_id, file_name) VALUES(?, ?)")
            .bind(id.to_string())
            .bind(name)
            .execute(self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(FileId(id))
    }

    pub async fn user(&self, user: &NewUser) -> Result<UserId, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query(
            r#"INSERT INTO "user"(user_id, user_name, kana, mail, password, entry_date, office_id, user_icon_id, goal)
               VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(&user.user_name)
        .bind(&user.kana)
        .bind(&user.mail)
        .bind(&user.password_hash)
        .bind(user.entry_date)
        .bind(user.office_id.0.to_string())
        .bind(user.user_icon_id.0.to_string())
        .bind(&user.goal)
        .execute(self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(UserId(id))
    }

    pub async fn department(&self, name: &str, active: bool) -> Result<DepartmentId, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO department(department_id, department_name, active) VALUES(?, ?, ?)")
            .bind(id.to_string())
            .bind(name)
            .bind(active)
            .execute(self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(DepartmentId(id))
    }

    pub async fn role(&self, name: &str, active: bool) -> Result<RoleId, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO role(role_id, role_name, active) VALUES(?, ?, ?)")
            .bind(id.to_string())
            .bind(name)
            .bind(active)
            .execute(self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(RoleId(id))
    }

    /// Record a department/role assignment. `belong = false` marks a past assignment.
    pub async fn membership(
        &self,
        department_id: &DepartmentId,
        role_id: &RoleId,
        user_id: &UserId,
        entry_date: NaiveDate,
        belong: bool,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO department_role_member(department_id, role_id, user_id, entry_date, belong)
             VALUES(?, ?, ?, ?, ?)",
        )
        .bind(department_id.0.to_string())
        .bind(role_id.0.to_string())
        .bind(user_id.0.to_string())
        .bind(entry_date)
        .bind(belong)
        .execute(self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    pub async fn skill(&self, name: &str) -> Result<SkillId, StoreError> {
        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO skill(skill_id, skill_name) VALUES(?, ?)")
            .bind(id.to_string())
            .bind(name)
            .execute(self.pool)
            .await
            .map_err(|e| {
                let s = e.to_string();
                if s.contains("UNIQUE") {
                    StoreError::InvalidData(format!("duplicate skill: {}", name))
                } else {
                    StoreError::Backend(s)
                }
            })?;
        Ok(SkillId(id))
    }

    pub async fn skill_member(&self, skill_id: &SkillId, user_id: &UserId) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO skill_member(skill_id, user_id) VALUES(?, ?)")
            .bind(skill_id.0.to_string())
            .bind(user_id.0.to_string())
            .execute(self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        Ok(())
    }

    /// Record a past match group made of `members`.
    pub async fn match_group(&self, members: &[UserId]) -> Result<MatchGroupId, StoreError> {
        let id = Uuid::now_v7();
        for member in members {
            sqlx::query("INSERT INTO match_group_member(match_group_id, user_id) VALUES(?, ?)")
                .bind(id.to_string())
                .bind(member.0.to_string())
                .execute(self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        Ok(MatchGroupId(id))
    }
}
