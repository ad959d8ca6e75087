use serde::Deserialize;

use crate::tasks::repo_types::TaskChanges;

/// Body of create and update. Missing fields fall back to empty/false; owner and id
/// fields sent by the client are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct TaskPayload {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub status: bool,
}

impl From<TaskPayload> for TaskChanges {
    fn from(p: TaskPayload) -> Self {
        Self {
            title: p.title,
            desc: p.desc,
            status: p.status,
        }
    }
}
