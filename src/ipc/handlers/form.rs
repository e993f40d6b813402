use crate::config;
use crate::dates;
use crate::ipc::error::{err, ok};
use crate::ipc::handlers::students::lookup_student;
use crate::ipc::types::{AppState, Request};
use crate::store;
use serde_json::json;

fn handle_mask_birth_date(req: &Request) -> serde_json::Value {
    let value = req
        .params
        .get("value")
        .and_then(|v| v.as_str())
        .unwrap_or("");
    ok(&req.id, json!({ "value": dates::mask_input(value) }))
}

fn handle_submit(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(conn) = state.db.as_ref() else {
        return err(&req.id, "no_workspace", "select a workspace first", None);
    };

    let enrollment = req
        .params
        .get("enrollment")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if enrollment.is_empty() {
        return err(&req.id, "bad_params", "missing enrollment number", None);
    }

    let birth_date = req
        .params
        .get("birthDate")
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default();
    if birth_date.is_empty() {
        return err(&req.id, "bad_params", "missing birth date", None);
    }

    let Some(parsed) = dates::parse_birth_date(&birth_date) else {
        return err(
            &req.id,
            "invalid_date",
            "birth date must be a valid DD/MM/YYYY date",
            None,
        );
    };
    if !dates::birth_year_in_range(&parsed) {
        return err(
            &req.id,
            "invalid_date",
            format!(
                "birth year must be between {} and {}",
                config::BIRTH_YEAR_MIN,
                config::BIRTH_YEAR_MAX
            ),
            None,
        );
    }

    let student = match lookup_student(conn, &enrollment) {
        Ok(Some(doc)) => doc,
        Ok(None) => return err(&req.id, "not_found", "enrollment number not found", None),
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    };

    // Pre-insert existence check only; two racing submissions can both pass.
    match store::find_eq(conn, config::SUBMISSIONS, "enrollment", &enrollment) {
        Ok(hits) if !hits.is_empty() => {
            return err(
                &req.id,
                "already_submitted",
                "a submission for this enrollment already exists",
                None,
            )
        }
        Ok(_) => {}
        Err(e) => return err(&req.id, "db_query_failed", e.to_string(), None),
    }

    let email = config::student_email(&enrollment);
    let submission = json!({
        "enrollment": enrollment,
        "name": student.get("name").and_then(|v| v.as_str()).unwrap_or(""),
        "grade": student.get("grade").and_then(|v| v.as_str()).unwrap_or(""),
        "birthDate": birth_date,
        "email": email,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });

    match store::insert(conn, config::SUBMISSIONS, &submission) {
        Ok(key) => ok(&req.id, json!({ "submissionId": key, "email": email })),
        Err(e) => err(&req.id, "db_write_failed", e.to_string(), None),
    }
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "form.maskBirthDate" => Some(handle_mask_birth_date(req)),
        "form.submit" => Some(handle_submit(state, req)),
        _ => None,
    }
}
