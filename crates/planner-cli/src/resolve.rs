//! Saved plan ID resolution and plan request write-back.
//!
//! - [`resolve_plan_id`] accepts either a UUID string or a path to a plan
//!   request file. If given a file, it reads the `[plan].id` field.
//! - [`write_plan_id_to_file`] uses `toml_edit` to set `id = "..."` in the
//!   `[plan]` table without disturbing comments or formatting.

use std::path::Path;

use anyhow::{Context, Result, bail};
use uuid::Uuid;

use planner_core::planner::PlanRequest;

/// Determine whether `input` refers to a file path or a bare UUID, and
/// return the resolved plan UUID.
///
/// Heuristic: if the string ends with `.toml`, contains a path separator,
/// or names a file that exists on disk, treat it as a file path. Otherwise,
/// try parsing as a UUID.
pub fn resolve_plan_id(input: &str) -> Result<Uuid> {
    if looks_like_file_path(input) {
        return read_plan_id_from_file(input);
    }
    match Uuid::parse_str(input) {
        Ok(uuid) => Ok(uuid),
        Err(_) if Path::new(input).is_file() => read_plan_id_from_file(input),
        Err(uuid_err) => Err(uuid_err).with_context(|| {
            format!("invalid plan ID: {input:?} (not a valid UUID and not a file)")
        }),
    }
}

fn looks_like_file_path(input: &str) -> bool {
    input.ends_with(".toml") || input.contains('/')
}

fn read_plan_id_from_file(path: &str) -> Result<Uuid> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan request: {path}"))?;

    // Only `[plan]` matters here; the rest is validated on create.
    let request: PlanRequest =
        toml::from_str(&content).with_context(|| format!("failed to parse TOML from {path}"))?;

    match request.plan.id {
        Some(id) => Ok(id),
        None => bail!(
            "plan request {path:?} has no id field in [plan] section.\n\
             Run `poc-planner plan create {path}` first to save it."
        ),
    }
}

/// Set `id = "<uuid>"` as the first key of the `[plan]` table, creating the
/// table at the top of the file if it is missing. All other content,
/// including comments, is preserved.
pub fn write_plan_id_to_file(path: &str, plan_id: Uuid) -> Result<()> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {path}"))?;

    let mut doc: toml_edit::DocumentMut = content
        .parse::<toml_edit::DocumentMut>()
        .with_context(|| format!("failed to parse {path} as TOML document"))?;

    if doc.get("plan").is_none() {
        let mut table = toml_edit::Table::new();
        table.set_position(0);
        doc.insert("plan", toml_edit::Item::Table(table));
    }

    let plan_table = doc
        .get_mut("plan")
        .and_then(|v| v.as_table_mut())
        .with_context(|| format!("{path}: `plan` is not a table"))?;

    let entries: Vec<(String, toml_edit::Item)> = plan_table
        .iter()
        .filter(|(k, _)| *k != "id")
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();

    plan_table.clear();
    plan_table.insert("id", toml_edit::value(plan_id.to_string()));
    for (key, value) in entries {
        plan_table.insert(&key, value);
    }

    std::fs::write(path, doc.to_string()).with_context(|| format!("failed to write {path}"))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use planner_core::planner::parse_plan_request;

    const REQUEST: &str = "# Acme POC\n[plan]\n\n[customer]\ncompany_name = \"Acme\"\n\n\
        [[solutions]]\nname = \"Password Safe\"\n# custom = \"\"\n";

    #[test]
    fn resolve_valid_uuid() {
        let id = "550e8400-e29b-41d4-a716-446655440000";
        let result = resolve_plan_id(id).unwrap();
        assert_eq!(result.to_string(), id);
    }

    #[test]
    fn resolve_invalid_uuid_no_file() {
        assert!(resolve_plan_id("not-a-uuid").is_err());
    }

    #[test]
    fn resolve_from_file_without_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.toml");
        std::fs::write(&path, REQUEST).unwrap();

        let err = resolve_plan_id(path.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("no id field"));
    }

    #[test]
    fn resolve_nonexistent_file() {
        assert!(resolve_plan_id("/tmp/nonexistent_poc_planner_request_xyz.toml").is_err());
    }

    #[test]
    fn write_back_preserves_comments_and_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.toml");
        std::fs::write(&path, REQUEST).unwrap();
        let path = path.to_str().unwrap();

        let id = Uuid::new_v4();
        write_plan_id_to_file(path, id).unwrap();

        let result = std::fs::read_to_string(path).unwrap();
        assert!(result.contains("# Acme POC"));
        assert!(result.contains("# custom = \"\""));
        assert_eq!(resolve_plan_id(path).unwrap(), id);

        let parsed = parse_plan_request(&result).expect("should parse after write-back");
        assert_eq!(parsed.plan.id, Some(id));
        assert_eq!(parsed.customer.company_name, "Acme");
    }

    #[test]
    fn write_back_replaces_existing_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("acme.toml");
        std::fs::write(&path, REQUEST).unwrap();
        let path = path.to_str().unwrap();

        write_plan_id_to_file(path, Uuid::new_v4()).unwrap();
        let second = Uuid::new_v4();
        write_plan_id_to_file(path, second).unwrap();

        let result = std::fs::read_to_string(path).unwrap();
        assert_eq!(result.matches("id = ").count(), 1);
        assert_eq!(resolve_plan_id(path).unwrap(), second);
    }

    #[test]
    fn write_back_creates_missing_plan_table() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bare.toml");
        std::fs::write(&path, "[[solutions]]\nname = \"Remote Support (RS)\"\n").unwrap();
        let path = path.to_str().unwrap();

        let id = Uuid::new_v4();
        write_plan_id_to_file(path, id).unwrap();

        let parsed = parse_plan_request(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(parsed.plan.id, Some(id));
        assert_eq!(parsed.solutions.len(), 1);
    }

    #[test]
    fn looks_like_file_path_tests() {
        assert!(looks_like_file_path("plan.toml"));
        assert!(looks_like_file_path("./plan.toml"));
        assert!(looks_like_file_path("plans/acme.toml"));
        assert!(!looks_like_file_path("550e8400-e29b-41d4-a716-446655440000"));
    }
}
