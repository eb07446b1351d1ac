//! Sub-projects declared by the manifest and the commits recorded for them

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// A sub-project declared in the manifest tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Project {
    /// Remote repository name, also the cache key within a snapshot
    pub name: String,
    /// Working tree location relative to the workspace root
    pub path: String,
}

impl Project {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// The commit a snapshot resolved for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommitRecord {
    #[serde(rename = "path")]
    pub relative_path: String,
    #[serde(rename = "sha")]
    pub commit: String,
}

impl CommitRecord {
    pub fn new(relative_path: impl Into<String>, commit: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            commit: commit.into(),
        }
    }
}

/// Index a parsed project list by name
///
/// Later declarations of the same name replace earlier ones.
pub fn index_by_name(projects: &[Project]) -> BTreeMap<String, Project> {
    projects
        .iter()
        .map(|p| (p.name.clone(), p.clone()))
        .collect()
}

/// Collapse duplicate names, last declaration wins
///
/// The surviving entry keeps the position where the name first appeared, so
/// the result still follows manifest order.
pub fn dedup_last_wins(projects: &[Project]) -> Vec<Project> {
    let mut slot: HashMap<&str, usize> = HashMap::new();
    let mut out: Vec<Project> = Vec::with_capacity(projects.len());
    for project in projects {
        match slot.get(project.name.as_str()) {
            Some(&i) => out[i] = project.clone(),
            None => {
                slot.insert(project.name.as_str(), out.len());
                out.push(project.clone());
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_by_name_last_wins() {
        let projects = vec![
            Project::new("x", "first/x"),
            Project::new("y", "y"),
            Project::new("x", "second/x"),
        ];
        let index = index_by_name(&projects);
        assert_eq!(index.len(), 2);
        assert_eq!(index["x"].path, "second/x");
    }

    #[test]
    fn test_dedup_keeps_first_position() {
        let projects = vec![
            Project::new("x", "first/x"),
            Project::new("y", "y"),
            Project::new("x", "second/x"),
        ];
        let deduped = dedup_last_wins(&projects);
        assert_eq!(
            deduped,
            vec![Project::new("x", "second/x"), Project::new("y", "y")]
        );
    }

    #[test]
    fn test_commit_record_field_names() {
        let record = CommitRecord::new("base/build", "abc123");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["path"], "base/build");
        assert_eq!(json["sha"], "abc123");
    }

    #[test]
    fn test_commit_record_rejects_unknown_fields() {
        let parsed: Result<CommitRecord, _> =
            serde_json::from_str(r#"{"path":"a","sha":"b","extra":1}"#);
        assert!(parsed.is_err());
    }
}
