// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    error::AppError,
    models::{
        exam::Exam,
        group::Group,
        item::{Item, ItemChanges, NewItem},
        score::{NewScoreEvent, ScoreEvent, ScoreTally},
        user::User,
    },
};

use super::Store;

/// Postgres-backed store.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Logs a failed query and turns it into an internal error.
fn db_error(op: &'static str) -> impl Fn(sqlx::Error) -> AppError {
    move |e| {
        tracing::error!("Failed to {}: {:?}", op, e);
        AppError::from(e)
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    e.as_database_error()
        .is_some_and(|db_err| db_err.is_unique_violation())
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password)
            VALUES ($1, $2)
            RETURNING id, username, password, created_at
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(format!("Username '{}' already exists", username))
            } else {
                db_error("register user")(e)
            }
        })
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch user"))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, username, password, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch user by username"))
    }

    async fn create_exam(&self, name: &str, user_id: i64) -> Result<Exam, AppError> {
        sqlx::query_as::<_, Exam>(
            r#"
            INSERT INTO exams (name, user_id)
            VALUES ($1, $2)
            RETURNING id, name, user_id, created_at, updated_at, deleted_at
            "#,
        )
        .bind(name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Exam with this name already exists".to_string())
            } else {
                db_error("create exam")(e)
            }
        })
    }

    async fn find_exam(&self, id: i64) -> Result<Option<Exam>, AppError> {
        sqlx::query_as::<_, Exam>(
            r#"
            SELECT id, name, user_id, created_at, updated_at, deleted_at
            FROM exams
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch exam"))
    }

    async fn find_exam_by_owner_and_name(
        &self,
        user_id: i64,
        name: &str,
    ) -> Result<Option<Exam>, AppError> {
        sqlx::query_as::<_, Exam>(
            r#"
            SELECT id, name, user_id, created_at, updated_at, deleted_at
            FROM exams
            WHERE user_id = $1 AND name = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(user_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch exam by name"))
    }

    async fn list_exams(&self) -> Result<Vec<Exam>, AppError> {
        sqlx::query_as::<_, Exam>(
            r#"
            SELECT id, name, user_id, created_at, updated_at, deleted_at
            FROM exams
            WHERE deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list exams"))
    }

    async fn rename_exam(&self, id: i64, name: &str) -> Result<Exam, AppError> {
        sqlx::query_as::<_, Exam>(
            r#"
            UPDATE exams SET name = $1, updated_at = NOW()
            WHERE id = $2 AND deleted_at IS NULL
            RETURNING id, name, user_id, created_at, updated_at, deleted_at
            "#,
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Exam with this name already exists".to_string())
            } else {
                db_error("rename exam")(e)
            }
        })?
        .ok_or(AppError::NotFound("Exam not found".to_string()))
    }

    async fn delete_exam(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let result = sqlx::query(
            "UPDATE exams SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("delete exam"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Exam not found".to_string()));
        }

        for table in ["item_groups", "items"] {
            sqlx::query(&format!(
                "UPDATE {} SET deleted_at = NOW() WHERE exam_id = $1 AND deleted_at IS NULL",
                table
            ))
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(db_error("delete exam contents"))?;
        }

        tx.commit().await.map_err(db_error("commit exam deletion"))?;
        Ok(())
    }

    async fn create_group(&self, exam_id: i64, name: &str) -> Result<Group, AppError> {
        sqlx::query_as::<_, Group>(
            r#"
            INSERT INTO item_groups (name, exam_id)
            VALUES ($1, $2)
            RETURNING id, name, exam_id, created_at, updated_at, deleted_at
            "#,
        )
        .bind(name)
        .bind(exam_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Group with this name already exists in this exam".to_string())
            } else {
                db_error("create group")(e)
            }
        })
    }

    async fn find_group(&self, id: i64) -> Result<Option<Group>, AppError> {
        sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, exam_id, created_at, updated_at, deleted_at
            FROM item_groups
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch group"))
    }

    async fn find_group_by_exam_and_name(
        &self,
        exam_id: i64,
        name: &str,
    ) -> Result<Option<Group>, AppError> {
        sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, exam_id, created_at, updated_at, deleted_at
            FROM item_groups
            WHERE exam_id = $1 AND name = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(exam_id)
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch group by name"))
    }

    async fn list_groups_by_exam(&self, exam_id: i64) -> Result<Vec<Group>, AppError> {
        sqlx::query_as::<_, Group>(
            r#"
            SELECT id, name, exam_id, created_at, updated_at, deleted_at
            FROM item_groups
            WHERE exam_id = $1 AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list groups"))
    }

    async fn rename_group(&self, id: i64, name: &str) -> Result<Group, AppError> {
        sqlx::query_as::<_, Group>(
            r#"
            UPDATE item_groups SET name = $1, updated_at = NOW()
            WHERE id = $2 AND deleted_at IS NULL
            RETURNING id, name, exam_id, created_at, updated_at, deleted_at
            "#,
        )
        .bind(name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Group with this name already exists in this exam".to_string())
            } else {
                db_error("rename group")(e)
            }
        })?
        .ok_or(AppError::NotFound("Group not found".to_string()))
    }

    async fn delete_group(&self, id: i64) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await.map_err(db_error("begin transaction"))?;

        let result = sqlx::query(
            "UPDATE item_groups SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("delete group"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Group not found".to_string()));
        }

        sqlx::query(
            "UPDATE items SET deleted_at = NOW() WHERE group_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .map_err(db_error("delete group items"))?;

        tx.commit().await.map_err(db_error("commit group deletion"))?;
        Ok(())
    }

    async fn create_item(&self, item: NewItem) -> Result<Item, AppError> {
        sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (name, image, exam_id, group_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, image, exam_id, group_id, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&item.name)
        .bind(&item.image)
        .bind(item.exam_id)
        .bind(item.group_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("create item"))
    }

    async fn find_item(&self, id: i64) -> Result<Option<Item>, AppError> {
        sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, image, exam_id, group_id, created_at, updated_at, deleted_at
            FROM items
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("fetch item"))
    }

    async fn list_items_by_exam(&self, exam_id: i64) -> Result<Vec<Item>, AppError> {
        sqlx::query_as::<_, Item>(
            r#"
            SELECT id, name, image, exam_id, group_id, created_at, updated_at, deleted_at
            FROM items
            WHERE exam_id = $1 AND deleted_at IS NULL
            ORDER BY id
            "#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("list items"))
    }

    async fn update_item(&self, id: i64, changes: ItemChanges) -> Result<Item, AppError> {
        sqlx::query_as::<_, Item>(
            r#"
            UPDATE items SET name = $1, image = $2, group_id = $3, updated_at = NOW()
            WHERE id = $4 AND deleted_at IS NULL
            RETURNING id, name, image, exam_id, group_id, created_at, updated_at, deleted_at
            "#,
        )
        .bind(&changes.name)
        .bind(&changes.image)
        .bind(changes.group_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("update item"))?
        .ok_or(AppError::NotFound("Item not found".to_string()))
    }

    async fn delete_item(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE items SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error("delete item"))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Item not found".to_string()));
        }
        Ok(())
    }

    async fn insert_score_event(&self, event: NewScoreEvent) -> Result<ScoreEvent, AppError> {
        sqlx::query_as::<_, ScoreEvent>(
            r#"
            INSERT INTO score_events (exam_id, item_id, user_id, correct)
            VALUES ($1, $2, $3, $4)
            RETURNING id, exam_id, item_id, user_id, correct, created_at
            "#,
        )
        .bind(event.exam_id)
        .bind(event.item_id)
        .bind(event.user_id)
        .bind(event.correct)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("record score event"))
    }

    async fn count_score_events(&self, exam_id: i64) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM score_events WHERE exam_id = $1")
            .bind(exam_id)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("count score events"))
    }

    async fn tally_scores(&self, exam_id: i64) -> Result<Vec<ScoreTally>, AppError> {
        sqlx::query_as::<_, ScoreTally>(
            r#"
            SELECT
                s.user_id,
                u.username,
                COUNT(*) FILTER (WHERE s.correct) AS correct,
                COUNT(*) FILTER (WHERE NOT s.correct) AS wrong
            FROM score_events s
            JOIN users u ON u.id = s.user_id
            WHERE s.exam_id = $1
            GROUP BY s.user_id, u.username
            ORDER BY s.user_id
            "#,
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("tally scores"))
    }
}
