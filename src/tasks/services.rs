use anyhow::Context;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::ApiError,
    pagination::{PageMeta, PageRequest},
    state::AppState,
    tasks::{
        dto::TaskPayload,
        repo_types::{NewTask, Task},
    },
};

pub const TASK_NOT_FOUND: &str = "Task not found";

pub fn parse_task_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::validation("Invalid task ID"))
}

pub async fn create_task(
    state: &AppState,
    owner: Uuid,
    payload: TaskPayload,
) -> Result<Task, ApiError> {
    let task = state
        .tasks
        .insert(NewTask {
            id: Uuid::new_v4(),
            title: payload.title,
            desc: payload.desc,
            status: payload.status,
            user_id: owner,
        })
        .await
        .context("insert task")?;
    info!(task_id = %task.id, user_id = %owner, "task created");
    Ok(task)
}

/// Count and page fetch are two separate reads; under concurrent writes the total
/// may not match the page.
pub async fn list_tasks(
    state: &AppState,
    owner: Option<Uuid>,
    request: PageRequest,
) -> Result<(Vec<Task>, PageMeta), ApiError> {
    let total = state.tasks.count(owner).await.context("count tasks")?;
    let tasks = state
        .tasks
        .list(owner, request.limit(), request.offset())
        .await
        .context("list tasks")?;
    Ok((tasks, PageMeta::new(request, total)))
}

/// Another user's task is reported exactly like a missing one.
pub async fn get_task(state: &AppState, caller: Uuid, id: Uuid) -> Result<Task, ApiError> {
    state
        .tasks
        .find_owned(id, caller)
        .await
        .context("find task")?
        .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))
}

/// Loads the task by id alone so a foreign task yields 403 rather than 404.
async fn load_for_mutation(
    state: &AppState,
    caller: Uuid,
    id: Uuid,
    denied: &str,
) -> Result<Task, ApiError> {
    let task = state
        .tasks
        .find_by_id(id)
        .await
        .context("find task")?
        .ok_or_else(|| ApiError::not_found(TASK_NOT_FOUND))?;
    if task.user_id != caller {
        warn!(task_id = %id, user_id = %caller, owner_id = %task.user_id, "ownership check failed");
        return Err(ApiError::forbidden(denied));
    }
    Ok(task)
}

pub async fn update_task(
    state: &AppState,
    caller: Uuid,
    id: Uuid,
    payload: TaskPayload,
) -> Result<(), ApiError> {
    load_for_mutation(state, caller, id, "Unauthorized to update this task").await?;

    let matched = state
        .tasks
        .update_owned(id, caller, payload.into())
        .await
        .context("update task")?;
    if matched == 0 {
        // deleted between the check and the write
        return Err(ApiError::not_found(TASK_NOT_FOUND));
    }
    info!(task_id = %id, user_id = %caller, "task updated");
    Ok(())
}

pub async fn delete_task(state: &AppState, caller: Uuid, id: Uuid) -> Result<(), ApiError> {
    load_for_mutation(state, caller, id, "Unauthorized to delete this task").await?;

    let deleted = state
        .tasks
        .delete_owned(id, caller)
        .await
        .context("delete task")?;
    if deleted == 0 {
        return Err(ApiError::not_found(TASK_NOT_FOUND));
    }
    info!(task_id = %id, user_id = %caller, "task deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(title: &str) -> TaskPayload {
        TaskPayload {
            title: title.into(),
            desc: "d".into(),
            status: false,
        }
    }

    #[test]
    fn task_id_must_be_a_uuid() {
        assert!(matches!(parse_task_id("123"), Err(ApiError::Validation(_))));
        assert!(parse_task_id(&Uuid::new_v4().to_string()).is_ok());
    }

    #[tokio::test]
    async fn owner_comes_from_caller() {
        let state = AppState::fake();
        let owner = Uuid::new_v4();
        let task = create_task(&state, owner, payload("x")).await.unwrap();
        assert_eq!(task.user_id, owner);
        assert_eq!(get_task(&state, owner, task.id).await.unwrap().id, task.id);
    }

    #[tokio::test]
    async fn foreign_task_is_hidden_on_get_but_forbidden_on_mutation() {
        let state = AppState::fake();
        let (alice, bob) = (Uuid::new_v4(), Uuid::new_v4());
        let task = create_task(&state, alice, payload("x")).await.unwrap();

        assert!(matches!(
            get_task(&state, bob, task.id).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            update_task(&state, bob, task.id, payload("y")).await,
            Err(ApiError::Forbidden(_))
        ));
        assert!(matches!(
            delete_task(&state, bob, task.id).await,
            Err(ApiError::Forbidden(_))
        ));
        // untouched
        assert_eq!(get_task(&state, alice, task.id).await.unwrap().title, "x");
    }

    #[tokio::test]
    async fn update_replaces_mutable_fields() {
        let state = AppState::fake();
        let owner = Uuid::new_v4();
        let task = create_task(&state, owner, payload("x")).await.unwrap();
        update_task(
            &state,
            owner,
            task.id,
            TaskPayload {
                title: "new".into(),
                desc: "desc".into(),
                status: true,
            },
        )
        .await
        .unwrap();
        let updated = get_task(&state, owner, task.id).await.unwrap();
        assert_eq!(updated.title, "new");
        assert_eq!(updated.desc, "desc");
        assert!(updated.status);
        assert_eq!(updated.user_id, owner);
    }

    #[tokio::test]
    async fn missing_task_is_not_found_everywhere() {
        let state = AppState::fake();
        let caller = Uuid::new_v4();
        let id = Uuid::new_v4();
        assert!(matches!(get_task(&state, caller, id).await, Err(ApiError::NotFound(_))));
        assert!(matches!(
            update_task(&state, caller, id, payload("y")).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(delete_task(&state, caller, id).await, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn listing_pages_through_tasks() {
        let state = AppState::fake();
        let owner = Uuid::new_v4();
        for i in 0..25 {
            create_task(&state, owner, payload(&format!("t{i}"))).await.unwrap();
        }
        create_task(&state, Uuid::new_v4(), payload("other")).await.unwrap();

        let (page, meta) = list_tasks(
            &state,
            Some(owner),
            PageRequest::Paged { page: 3, per_page: 10 },
        )
        .await
        .unwrap();
        assert_eq!(page.len(), 5);
        assert_eq!(page[0].title, "t20");
        assert_eq!(meta.total, 25);
        assert!(!meta.has_next_page);

        let (all, meta) = list_tasks(&state, None, PageRequest::Unbounded).await.unwrap();
        assert_eq!(all.len(), 26);
        assert_eq!(meta.per_page, 26);
    }
}
