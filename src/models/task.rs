use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::config::TaskListParams;

/// Value of the `completed` form field that marks a task as done.
pub const COMPLETED_TRUE: &str = "True";

/// Represents a task as stored in the database and returned to clients.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Task {
    pub id: i32,
    /// Owner of the task.
    pub user_id: i32,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub completed: bool,
    /// Set when the task last moved to completed, cleared when reopened.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Form submitted to create a task.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTaskForm {
    /// Between 4 and 25 characters.
    #[validate(length(min = 4, max = 25))]
    pub name: String,
    /// Between 4 and 250 characters.
    #[validate(length(min = 4, max = 250))]
    pub description: String,
}

/// Form submitted from a task's own page.
///
/// The submit button decides the action: `change` switches the page into edit
/// mode, `save` writes `description` and the completion state.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditTaskForm {
    pub change: Option<String>,
    pub save: Option<String>,
    #[validate(required, length(min = 4, max = 250))]
    pub description: Option<String>,
    /// Checkbox value; only `"True"` marks the task completed.
    pub completed: Option<String>,
}

/// What an [`EditTaskForm`] submission asks for.
#[derive(Debug, PartialEq, Eq)]
pub enum EditAction {
    View,
    Edit,
    Save { description: String, completed: bool },
}

impl EditTaskForm {
    /// Resolves the requested action, validating the fields only for `save`.
    pub fn action(self) -> Result<EditAction, validator::ValidationErrors> {
        if self.change.is_some() {
            return Ok(EditAction::Edit);
        }
        if self.save.is_none() {
            return Ok(EditAction::View);
        }
        self.validate()?;
        Ok(EditAction::Save {
            completed: self.completed.as_deref() == Some(COMPLETED_TRUE),
            description: self.description.unwrap_or_default(),
        })
    }
}

/// Raw query string of the task list.
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    pub sorted: Option<String>,
    pub filter: Option<String>,
    pub search: Option<String>,
}

impl TaskListQuery {
    pub fn params(&self) -> TaskListParams {
        TaskListParams::resolve(
            self.sorted.as_deref(),
            self.filter.as_deref(),
            self.search.as_deref(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FilterOption, SortOption};

    #[test]
    fn test_create_form_validation() {
        let valid = CreateTaskForm {
            name: "Buy milk".to_string(),
            description: "Two litres".to_string(),
        };
        assert!(valid.validate().is_ok());

        let short_name = CreateTaskForm {
            name: "abc".to_string(),
            description: "Two litres".to_string(),
        };
        assert!(short_name.validate().is_err());

        let long_description = CreateTaskForm {
            name: "Buy milk".to_string(),
            description: "b".repeat(251),
        };
        assert!(long_description.validate().is_err());

        let long_name = CreateTaskForm {
            name: "a".repeat(26),
            description: "Two litres".to_string(),
        };
        assert!(long_name.validate().is_err());
    }

    #[test]
    fn test_edit_form_actions() {
        let change = EditTaskForm {
            change: Some("".to_string()),
            ..Default::default()
        };
        assert_eq!(change.action().unwrap(), EditAction::Edit);

        assert_eq!(EditTaskForm::default().action().unwrap(), EditAction::View);

        let save_done = EditTaskForm {
            save: Some("".to_string()),
            description: Some("Updated text".to_string()),
            completed: Some("True".to_string()),
            ..Default::default()
        };
        assert_eq!(
            save_done.action().unwrap(),
            EditAction::Save {
                description: "Updated text".to_string(),
                completed: true
            }
        );

        let save_open = EditTaskForm {
            save: Some("".to_string()),
            description: Some("Updated text".to_string()),
            completed: Some("on".to_string()),
            ..Default::default()
        };
        assert_eq!(
            save_open.action().unwrap(),
            EditAction::Save {
                description: "Updated text".to_string(),
                completed: false
            }
        );
    }

    #[test]
    fn test_save_requires_valid_description() {
        let missing = EditTaskForm {
            save: Some("".to_string()),
            ..Default::default()
        };
        assert!(missing.action().is_err());

        let short = EditTaskForm {
            save: Some("".to_string()),
            description: Some("abc".to_string()),
            ..Default::default()
        };
        assert!(short.action().is_err());
    }

    #[test]
    fn test_list_query_params() {
        let query = TaskListQuery {
            sorted: Some("name".to_string()),
            filter: Some("uncompleted".to_string()),
            search: None,
        };
        let params = query.params();
        assert_eq!(params.sort, SortOption::Name);
        assert_eq!(params.filter, FilterOption::Uncompleted);
        assert_eq!(params.search, "");
    }
}
