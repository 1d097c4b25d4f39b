use std::cmp::Ordering;
use std::str::FromStr;

use tracing::warn;

use super::repo_types::{Task, TaskPriority, TaskStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    CreatedAt,
    UpdatedAt,
    Title,
    Status,
    Priority,
}

/// Sort key in the `-createdAt` / `title` form the web client sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSort {
    pub field: SortField,
    pub descending: bool,
}

impl Default for TaskSort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

impl TaskSort {
    /// Unknown keys fall back to newest-first.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Self::default();
        };
        let (descending, key) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let field = match key {
            "createdAt" => SortField::CreatedAt,
            "updatedAt" => SortField::UpdatedAt,
            "title" => SortField::Title,
            "status" => SortField::Status,
            "priority" => SortField::Priority,
            other => {
                warn!(sort = %other, "unknown sort key, using default");
                return Self::default();
            }
        };
        Self { field, descending }
    }

    /// SQL ordering expression; constant text, never user input.
    pub fn sql(&self) -> &'static str {
        match (self.field, self.descending) {
            (SortField::CreatedAt, false) => "created_at ASC",
            (SortField::CreatedAt, true) => "created_at DESC",
            (SortField::UpdatedAt, false) => "updated_at ASC",
            (SortField::UpdatedAt, true) => "updated_at DESC",
            (SortField::Title, false) => "title COLLATE \"C\" ASC",
            (SortField::Title, true) => "title COLLATE \"C\" DESC",
            (SortField::Status, false) => {
                "CASE status WHEN 'pending' THEN 0 WHEN 'in-progress' THEN 1 ELSE 2 END ASC"
            }
            (SortField::Status, true) => {
                "CASE status WHEN 'pending' THEN 0 WHEN 'in-progress' THEN 1 ELSE 2 END DESC"
            }
            (SortField::Priority, false) => {
                "CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END ASC"
            }
            (SortField::Priority, true) => {
                "CASE priority WHEN 'low' THEN 0 WHEN 'medium' THEN 1 ELSE 2 END DESC"
            }
        }
    }

    /// In-process equivalent of [`TaskSort::sql`]. Callers rely on a stable sort
    /// to keep insertion order for ties.
    pub fn compare(&self, a: &Task, b: &Task) -> Ordering {
        let ord = match self.field {
            SortField::CreatedAt => a.created_at.cmp(&b.created_at),
            SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
            // code point order, same as `COLLATE "C"` in a UTF-8 database
            SortField::Title => a.title.cmp(&b.title),
            SortField::Status => a.status.rank().cmp(&b.status.rank()),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
        };
        if self.descending {
            ord.reverse()
        } else {
            ord
        }
    }
}

/// Parsed `status`/`priority` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter<T> {
    Any,
    Only(T),
    /// The client asked for a value that does not exist; nothing can match.
    Unmatchable,
}

impl<T: FromStr> Filter<T> {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            None | Some("") | Some("all") => Self::Any,
            Some(v) => v.parse().map(Self::Only).unwrap_or(Self::Unmatchable),
        }
    }
}

/// Store-level query; always combined with the owner id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub search: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub sort: TaskSort,
}

impl TaskQuery {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(status) = self.status {
            if task.status != status {
                return false;
            }
        }
        if let Some(priority) = self.priority {
            if task.priority != priority {
                return false;
            }
        }
        match &self.search {
            Some(needle) => {
                let needle = needle.to_lowercase();
                task.title.to_lowercase().contains(&needle)
                    || task.description.to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}
