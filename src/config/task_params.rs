//! Static tables translating the task list's query parameters into SQL.
//!
//! The `ORDER BY` fragment handed to the data-access layer always comes from
//! [`SortOption::order_by`], never from the request itself.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOption {
    /// Oldest first.
    #[default]
    Up,
    /// Newest first.
    Down,
    /// By completion time, uncompleted tasks last.
    Completed,
    /// Alphabetical by name.
    Name,
}

impl SortOption {
    pub const ALL: [SortOption; 4] = [
        SortOption::Up,
        SortOption::Down,
        SortOption::Completed,
        SortOption::Name,
    ];

    /// Unknown or absent values fall back to the default order.
    pub fn from_param(value: Option<&str>) -> Self {
        Self::ALL
            .into_iter()
            .find(|option| Some(option.as_param()) == value)
            .unwrap_or_default()
    }

    pub fn as_param(self) -> &'static str {
        match self {
            SortOption::Up => "up",
            SortOption::Down => "down",
            SortOption::Completed => "completed",
            SortOption::Name => "name",
        }
    }

    pub fn order_by(self) -> &'static str {
        match self {
            SortOption::Up => "created_at, id",
            SortOption::Down => "created_at DESC, id DESC",
            SortOption::Completed => "completed_at, id",
            SortOption::Name => "name, id",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortOption::Up => "Oldest first",
            SortOption::Down => "Newest first",
            SortOption::Completed => "By completion date",
            SortOption::Name => "By name",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterOption {
    #[default]
    All,
    Completed,
    Uncompleted,
}

impl FilterOption {
    pub const ALL: [FilterOption; 3] = [
        FilterOption::All,
        FilterOption::Completed,
        FilterOption::Uncompleted,
    ];

    /// Unknown or absent values fall back to showing every task.
    pub fn from_param(value: Option<&str>) -> Self {
        Self::ALL
            .into_iter()
            .find(|option| Some(option.as_param()) == value)
            .unwrap_or_default()
    }

    pub fn as_param(self) -> &'static str {
        match self {
            FilterOption::All => "all",
            FilterOption::Completed => "completed",
            FilterOption::Uncompleted => "uncompleted",
        }
    }

    /// Values of `tasks.completed` admitted by this filter.
    pub fn completed_values(self) -> &'static [bool] {
        match self {
            FilterOption::All => &[true, false],
            FilterOption::Completed => &[true],
            FilterOption::Uncompleted => &[false],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FilterOption::All => "All",
            FilterOption::Completed => "Completed only",
            FilterOption::Uncompleted => "Uncompleted only",
        }
    }
}

/// A selectable option as presented to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionLabel {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn sort_labels() -> Vec<OptionLabel> {
    SortOption::ALL
        .iter()
        .map(|o| OptionLabel {
            value: o.as_param(),
            label: o.label(),
        })
        .collect()
}

pub fn filter_labels() -> Vec<OptionLabel> {
    FilterOption::ALL
        .iter()
        .map(|o| OptionLabel {
            value: o.as_param(),
            label: o.label(),
        })
        .collect()
}

/// Resolved listing parameters for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskListParams {
    pub sort: SortOption,
    pub filter: FilterOption,
    pub search: String,
}

impl TaskListParams {
    pub fn resolve(sorted: Option<&str>, filter: Option<&str>, search: Option<&str>) -> Self {
        Self {
            sort: SortOption::from_param(sorted),
            filter: FilterOption::from_param(filter),
            search: search.unwrap_or_default().to_string(),
        }
    }

    /// `ILIKE` pattern matching names that contain the search string.
    pub fn search_pattern(&self) -> String {
        format!("%{}%", self.search)
    }
}
