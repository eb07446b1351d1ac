//! Recursive manifest parser
//!
//! Flattens a root manifest and its includes into one ordered project list:
//! the projects of a file come first, in document order, followed by the
//! projects of each include, depth-first.

use crate::errors::{Result, SnapError};
use crate::model::Project;
use crate::{log_op_end, log_op_error, log_op_start};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

const PROJECT_TAG: &str = "project";
const INCLUDE_TAG: &str = "include";

/// Parse `manifest_file` (relative to `root_dir`) and every manifest it includes
///
/// Duplicate project names are kept; use `dedup_last_wins` or `index_by_name`
/// for the name-indexed view.
pub fn parse_manifest(root_dir: &Path, manifest_file: &str) -> Result<Vec<Project>> {
    let start = Instant::now();
    log_op_start!("parse_manifest", manifest = manifest_file);

    let mut projects = Vec::new();
    let mut stack = Vec::new();
    match collect(root_dir, manifest_file, &mut stack, &mut projects) {
        Ok(()) => {
            log_op_end!(
                "parse_manifest",
                duration_ms = start.elapsed().as_millis() as u64,
                project_count = projects.len() as u64
            );
            Ok(projects)
        }
        Err(err) => {
            log_op_error!(
                "parse_manifest",
                &err,
                duration_ms = start.elapsed().as_millis() as u64
            );
            Err(err)
        }
    }
}

fn collect(
    root_dir: &Path,
    manifest_file: &str,
    stack: &mut Vec<PathBuf>,
    out: &mut Vec<Project>,
) -> Result<()> {
    let full_path = root_dir.join(manifest_file);
    let manifest_path = full_path.display().to_string();

    let text = fs::read_to_string(&full_path).map_err(|e| SnapError::ManifestRead {
        path: manifest_path.clone(),
        reason: e.to_string(),
    })?;

    // Cycle identity; falls back to the joined path
    let identity = fs::canonicalize(&full_path).unwrap_or_else(|_| full_path.clone());
    if stack.contains(&identity) {
        return Err(SnapError::IncludeCycle { path: manifest_path }.into());
    }

    let doc = roxmltree::Document::parse(&text).map_err(|e| SnapError::ManifestParse {
        path: manifest_path.clone(),
        reason: e.to_string(),
    })?;

    tracing::debug!(manifest = %manifest_path, "parsing manifest");

    let mut includes = Vec::new();
    for node in doc.descendants().filter(|n| n.is_element()) {
        match node.tag_name().name() {
            PROJECT_TAG => {
                let name = required_attr(&node, "name", &manifest_path)?;
                let path = node.attribute("path").unwrap_or(name);
                out.push(Project::new(name, path));
            }
            INCLUDE_TAG => {
                includes.push(required_attr(&node, "name", &manifest_path)?.to_string());
            }
            _ => {}
        }
    }

    stack.push(identity);
    for include in &includes {
        collect(root_dir, include, stack, out)?;
    }
    stack.pop();

    Ok(())
}

fn required_attr<'a>(node: &roxmltree::Node<'a, '_>, attr: &str, manifest: &str) -> Result<&'a str> {
    node.attribute(attr).ok_or_else(|| {
        SnapError::ManifestMissingAttribute {
            path: manifest.to_string(),
            element: node.tag_name().name().to_string(),
            attribute: attr.to_string(),
        }
        .into()
    })
}
