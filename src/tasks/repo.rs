use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::tasks::repo_types::{NewTask, Task, TaskChanges, TaskRow};

/// The Tasks collection. `owner: None` means every task.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert(&self, task: NewTask) -> anyhow::Result<Task>;
    async fn count(&self, owner: Option<Uuid>) -> anyhow::Result<i64>;
    /// `limit: None` returns everything from `offset` on.
    async fn list(
        &self,
        owner: Option<Uuid>,
        limit: Option<i64>,
        offset: i64,
    ) -> anyhow::Result<Vec<Task>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Task>>;
    async fn find_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<Option<Task>>;
    /// Number of matched tasks (0 or 1).
    async fn update_owned(&self, id: Uuid, owner: Uuid, changes: TaskChanges)
        -> anyhow::Result<u64>;
    /// Number of deleted tasks (0 or 1).
    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<u64>;
}

#[derive(Clone)]
pub struct PgTaskRepository {
    db: PgPool,
}

impl PgTaskRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

const SELECT_TASK: &str = r#"
    SELECT t.id, t.title, t.description, t.status, t.user_id, t.created_at,
           u.first_name AS owner_first_name, u.last_name AS owner_last_name,
           u.email AS owner_email, u.phone AS owner_phone
    FROM tasks t
    LEFT JOIN users u ON u.id = t.user_id
"#;

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn insert(&self, task: NewTask) -> anyhow::Result<Task> {
        let row = sqlx::query_as::<_, TaskRow>(
            r#"
            INSERT INTO tasks (id, title, description, status, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, status, user_id, created_at,
                      NULL::text AS owner_first_name, NULL::text AS owner_last_name,
                      NULL::text AS owner_email, NULL::text AS owner_phone
            "#,
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.desc)
        .bind(task.status)
        .bind(task.user_id)
        .fetch_one(&self.db)
        .await?;
        Ok(row.into())
    }

    async fn count(&self, owner: Option<Uuid>) -> anyhow::Result<i64> {
        let total: i64 = match owner {
            Some(owner) => {
                sqlx::query_scalar("SELECT COUNT(*) FROM tasks WHERE user_id = $1")
                    .bind(owner)
                    .fetch_one(&self.db)
                    .await?
            }
            None => {
                sqlx::query_scalar("SELECT COUNT(*) FROM tasks")
                    .fetch_one(&self.db)
                    .await?
            }
        };
        Ok(total)
    }

    async fn list(
        &self,
        owner: Option<Uuid>,
        limit: Option<i64>,
        offset: i64,
    ) -> anyhow::Result<Vec<Task>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(SELECT_TASK);
        if let Some(owner) = owner {
            qb.push(" WHERE t.user_id = ").push_bind(owner);
        }
        qb.push(" ORDER BY t.created_at ASC, t.id ASC");
        if let Some(limit) = limit {
            qb.push(" LIMIT ").push_bind(limit);
        }
        qb.push(" OFFSET ").push_bind(offset);

        let rows = qb.build_query_as::<TaskRow>().fetch_all(&self.db).await?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!("{SELECT_TASK} WHERE t.id = $1"))
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        Ok(row.map(Task::from))
    }

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<Option<Task>> {
        let row = sqlx::query_as::<_, TaskRow>(&format!(
            "{SELECT_TASK} WHERE t.id = $1 AND t.user_id = $2"
        ))
        .bind(id)
        .bind(owner)
        .fetch_optional(&self.db)
        .await?;
        Ok(row.map(Task::from))
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: TaskChanges,
    ) -> anyhow::Result<u64> {
        let res = sqlx::query(
            r#"
            UPDATE tasks
               SET title = $3, description = $4, status = $5
             WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .bind(&changes.title)
        .bind(&changes.desc)
        .bind(changes.status)
        .execute(&self.db)
        .await?;
        Ok(res.rows_affected())
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(owner)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected())
    }
}
