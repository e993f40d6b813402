use crate::config;
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use crate::store;
use serde_json::json;
use std::path::PathBuf;

fn csv_quote(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn field<'a>(doc: &'a serde_json::Value, name: &str) -> &'a str {
    doc.get(name).and_then(|v| v.as_str()).unwrap_or("")
}

fn handle_export(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let enrollment = req
        .params
        .get("enrollment")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .unwrap_or("");
    if enrollment != config::EXPORT_ENROLLMENT {
        return err(
            &req.id,
            "forbidden",
            "this enrollment number cannot export submissions",
            None,
        );
    }

    let out_path = match req.params.get("outPath").and_then(|v| v.as_str()) {
        Some(v) => PathBuf::from(v),
        None => return err(&req.id, "bad_params", "missing params.outPath", None),
    };

    let submissions = match store::list_all(conn, config::SUBMISSIONS) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    let mut out = String::from("name,email,grade,birth_date\n");
    for (_, doc) in &submissions {
        out.push_str(&format!(
            "{},{},{},{}\n",
            csv_quote(field(doc, "name")),
            csv_quote(field(doc, "email")),
            csv_quote(field(doc, "grade")),
            csv_quote(field(doc, "birthDate")),
        ));
    }

    if let Err(e) = std::fs::write(&out_path, out) {
        return err(&req.id, "export_write_failed", e.to_string(), None);
    }

    ok(
        &req.id,
        json!({
            "rowsExported": submissions.len(),
            "outPath": out_path.to_string_lossy(),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "submissions.export" => Some(handle_export(state, req)),
        _ => None,
    }
}
