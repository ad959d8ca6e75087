//! In-memory repositories backing `AppState::fake()`.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::repo::{InsertUserError, UserRepository};
use crate::auth::repo_types::{NewUser, User};
use crate::tasks::repo::TaskRepository;
use crate::tasks::repo_types::{NewTask, OwnerSnapshot, Task, TaskChanges};

#[derive(Default)]
pub struct MemoryUserRepository {
    users: Mutex<Vec<User>>,
}

impl MemoryUserRepository {
    fn snapshot(&self, id: Uuid) -> Option<OwnerSnapshot> {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.id == id).map(|u| OwnerSnapshot {
            id: u.id,
            first_name: u.first_name.clone(),
            last_name: u.last_name.clone(),
            email: u.email.clone(),
            phone: u.phone.clone(),
        })
    }
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<User, InsertUserError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Err(InsertUserError::EmailTaken);
        }
        let user = User {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            password_hash: user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }
}

/// Keeps insertion order, which is the listing order. Reads attach the owner from
/// `users` the way the Postgres join does; inserts return no owner.
pub struct MemoryTaskRepository {
    tasks: Mutex<Vec<Task>>,
    users: Arc<MemoryUserRepository>,
}

impl MemoryTaskRepository {
    pub fn new(users: Arc<MemoryUserRepository>) -> Self {
        Self {
            tasks: Mutex::default(),
            users,
        }
    }

    fn joined(&self, task: &Task) -> Task {
        Task {
            user: self.users.snapshot(task.user_id),
            ..task.clone()
        }
    }
}

#[async_trait]
impl TaskRepository for MemoryTaskRepository {
    async fn insert(&self, task: NewTask) -> anyhow::Result<Task> {
        let task = Task {
            id: task.id,
            title: task.title,
            desc: task.desc,
            status: task.status,
            user_id: task.user_id,
            created_at: OffsetDateTime::now_utc(),
            user: None,
        };
        self.tasks.lock().unwrap().push(task.clone());
        Ok(task)
    }

    async fn count(&self, owner: Option<Uuid>) -> anyhow::Result<i64> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks
            .iter()
            .filter(|t| owner.map_or(true, |o| t.user_id == o))
            .count() as i64)
    }

    async fn list(
        &self,
        owner: Option<Uuid>,
        limit: Option<i64>,
        offset: i64,
    ) -> anyhow::Result<Vec<Task>> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks
            .iter()
            .filter(|t| owner.map_or(true, |o| t.user_id == o))
            .skip(offset.max(0) as usize)
            .take(limit.map_or(usize::MAX, |l| l.max(0) as usize))
            .map(|t| self.joined(t))
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Task>> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks.iter().find(|t| t.id == id).map(|t| self.joined(t)))
    }

    async fn find_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<Option<Task>> {
        let tasks = self.tasks.lock().unwrap();
        Ok(tasks
            .iter()
            .find(|t| t.id == id && t.user_id == owner)
            .map(|t| self.joined(t)))
    }

    async fn update_owned(
        &self,
        id: Uuid,
        owner: Uuid,
        changes: TaskChanges,
    ) -> anyhow::Result<u64> {
        let mut tasks = self.tasks.lock().unwrap();
        match tasks.iter_mut().find(|t| t.id == id && t.user_id == owner) {
            Some(task) => {
                task.title = changes.title;
                task.desc = changes.desc;
                task.status = changes.status;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_owned(&self, id: Uuid, owner: Uuid) -> anyhow::Result<u64> {
        let mut tasks = self.tasks.lock().unwrap();
        let before = tasks.len();
        tasks.retain(|t| !(t.id == id && t.user_id == owner));
        Ok((before - tasks.len()) as u64)
    }
}
