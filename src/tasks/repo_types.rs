use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// Row shape of a task joined with its owner.
#[derive(Debug, FromRow)]
pub struct TaskRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: bool,
    pub user_id: Uuid,
    pub created_at: OffsetDateTime,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
    pub owner_email: Option<String>,
    pub owner_phone: Option<String>,
}

/// Owner details embedded in a task for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSnapshot {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub desc: String,
    pub status: bool,
    pub user_id: Uuid,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<OwnerSnapshot>,
}

impl From<TaskRow> for Task {
    fn from(r: TaskRow) -> Self {
        let user = match (r.owner_first_name, r.owner_last_name, r.owner_email, r.owner_phone) {
            (Some(first_name), Some(last_name), Some(email), Some(phone)) => Some(OwnerSnapshot {
                id: r.user_id,
                first_name,
                last_name,
                email,
                phone,
            }),
            _ => None,
        };
        Self {
            id: r.id,
            title: r.title,
            desc: r.description,
            status: r.status,
            user_id: r.user_id,
            created_at: r.created_at,
            user,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub id: Uuid,
    pub title: String,
    pub desc: String,
    pub status: bool,
    pub user_id: Uuid,
}

/// The only mutable fields of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: String,
    pub desc: String,
    pub status: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> TaskRow {
        TaskRow {
            id: Uuid::new_v4(),
            title: "Write report".into(),
            description: "quarterly".into(),
            status: true,
            user_id: Uuid::new_v4(),
            created_at: OffsetDateTime::UNIX_EPOCH,
            owner_first_name: Some("Ada".into()),
            owner_last_name: Some("Lovelace".into()),
            owner_email: Some("ada@b.com".into()),
            owner_phone: Some("555".into()),
        }
    }

    #[test]
    fn joined_owner_becomes_snapshot() {
        let r = row();
        let (id, user_id) = (r.id, r.user_id);
        let task = Task::from(r);

        assert_eq!(task.id, id);
        assert_eq!(task.desc, "quarterly");
        assert_eq!(
            task.user,
            Some(OwnerSnapshot {
                id: user_id,
                first_name: "Ada".into(),
                last_name: "Lovelace".into(),
                email: "ada@b.com".into(),
                phone: "555".into(),
            })
        );
    }

    #[test]
    fn any_missing_owner_column_drops_snapshot() {
        for missing in 0..4 {
            let mut r = row();
            match missing {
                0 => r.owner_first_name = None,
                1 => r.owner_last_name = None,
                2 => r.owner_email = None,
                _ => r.owner_phone = None,
            }
            let task = Task::from(r);
            assert_eq!(task.user, None);
            let json = serde_json::to_value(&task).unwrap();
            assert!(json.get("user").is_none());
        }
    }
}
