//! Query-string shapes for task and permission routes.

use serde::Deserialize;
use tasktrack_service::{TaskCriteria, TaskListOptions};

/// `GET /tasks` and `GET /tasks/all` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskListQuery {
    pub email: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
    pub sort: Option<String>,
    pub expand: Option<String>,
}

impl From<TaskListQuery> for TaskListOptions {
    fn from(query: TaskListQuery) -> Self {
        Self {
            email: query.email,
            page: query.page,
            per_page: query.per_page,
            sort: query.sort,
            expand: query.expand,
        }
    }
}

/// `GET /tasks/first` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FirstTaskQuery {
    pub email: Option<String>,
    pub status: Option<String>,
    pub title: Option<String>,
    pub expand: Option<String>,
}

impl FirstTaskQuery {
    /// Splits into the filter criteria and the expand option.
    #[must_use]
    pub fn into_parts(self) -> (TaskCriteria, Option<String>) {
        (
            TaskCriteria {
                email: self.email,
                status: self.status,
                title: self.title,
            },
            self.expand,
        )
    }
}

/// `GET /permissions` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PermissionQuery {
    pub email: Option<String>,
}
