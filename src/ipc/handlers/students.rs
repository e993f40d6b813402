use crate::config;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::roster;
use crate::store;
use rusqlite::Connection;
use serde_json::json;
use std::path::PathBuf;

/// Keyed read first; older rosters were loaded with generated keys, so fall
/// back to an equality query on the enrollment field.
pub fn lookup_student(
    conn: &Connection,
    enrollment: &str,
) -> anyhow::Result<Option<serde_json::Value>> {
    if let Some(doc) = store::get(conn, config::STUDENTS, enrollment)? {
        return Ok(Some(doc));
    }
    let hits = store::find_eq(conn, config::STUDENTS, "enrollment", enrollment)?;
    Ok(hits.into_iter().next().map(|(_, doc)| doc))
}

fn handle_lookup(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let enrollment = match req.params.get("enrollment").and_then(|v| v.as_str()) {
        Some(v) => v.trim().to_string(),
        None => return err(&req.id, "bad_params", "missing params.enrollment", None),
    };
    if enrollment.is_empty() {
        return err(&req.id, "bad_params", "enrollment must not be empty", None);
    }

    match lookup_student(conn, &enrollment) {
        Ok(Some(doc)) => ok(
            &req.id,
            json!({
                "enrollment": enrollment,
                "name": doc.get("name").and_then(|v| v.as_str()).unwrap_or(""),
                "grade": doc.get("grade").and_then(|v| v.as_str()).unwrap_or(""),
            }),
        ),
        Ok(None) => err(&req.id, "not_found", "enrollment number not found", None),
        Err(e) => err(&req.id, "db_query_failed", e.to_string(), None),
    }
}

fn handle_import_roster(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_mut() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };
    let path = match req.params.get("path").and_then(|v| v.as_str()) {
        Some(v) => PathBuf::from(v),
        None => return err(&req.id, "bad_params", "missing params.path", None),
    };

    let students = match roster::parse_roster_file(&path) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "roster_parse_failed", e.to_string(), None),
    };

    // Repeated enrollment numbers collapse to one document, last entry wins.
    let mut entries: Vec<(String, serde_json::Value)> = Vec::with_capacity(students.len());
    for s in &students {
        let body = json!({
            "enrollment": s.enrollment,
            "name": s.name,
            "grade": s.grade,
        });
        if let Some(existing) = entries.iter_mut().find(|(k, _)| *k == s.enrollment) {
            existing.1 = body;
        } else {
            entries.push((s.enrollment.clone(), body));
        }
    }

    match store::put_batch(conn, config::STUDENTS, &entries) {
        Ok(count) => ok(&req.id, json!({ "studentsImported": count })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "students.lookup" => Some(handle_lookup(state, req)),
        "students.importRoster" => Some(handle_import_roster(state, req)),
        _ => None,
    }
}
