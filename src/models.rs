// src/models.rs

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub id: i64,
    pub message: String,
    pub tags: Option<String>, // comma-joined, in the order they were supplied
    pub project: Option<String>,
    pub created_at: String, // SQLite CURRENT_TIMESTAMP, "YYYY-MM-DD HH:MM:SS" UTC
}

impl LogEntry {
    /// Splits the stored tag string back into names.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .map(|t| t.split(',').collect())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tag {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Project {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(tags: Option<&str>) -> LogEntry {
        LogEntry {
            id: 1,
            message: "m".to_string(),
            tags: tags.map(str::to_string),
            project: None,
            created_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    #[test]
    fn tag_list_splits_raw_value() {
        assert_eq!(entry(Some("A,B,A")).tag_list(), vec!["A", "B", "A"]);
        assert!(entry(None).tag_list().is_empty());
    }
}
