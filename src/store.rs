use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use uuid::Uuid;

use crate::config;

/// Schemaless JSON documents grouped into named collections. The rest of the
/// crate only touches the store through the functions below: read by key,
/// equality query, insert with a generated key, batch upsert, full listing.
pub fn open_store(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(config::STORE_FILENAME);
    let conn = Connection::open(db_path)?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS documents(
            collection TEXT NOT NULL,
            key TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY(collection, key)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection)",
        [],
    )?;

    Ok(conn)
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

fn parse_body(key: String, body: String) -> anyhow::Result<(String, serde_json::Value)> {
    let value: serde_json::Value = serde_json::from_str(&body)?;
    Ok((key, value))
}

pub fn get(
    conn: &Connection,
    collection: &str,
    key: &str,
) -> anyhow::Result<Option<serde_json::Value>> {
    let body: Option<String> = conn
        .query_row(
            "SELECT body FROM documents WHERE collection = ?1 AND key = ?2",
            params![collection, key],
            |r| r.get(0),
        )
        .optional()?;
    match body {
        Some(b) => Ok(Some(serde_json::from_str(&b)?)),
        None => Ok(None),
    }
}

/// Equality query on one top-level field of the document body.
pub fn find_eq(
    conn: &Connection,
    collection: &str,
    field: &str,
    value: &str,
) -> anyhow::Result<Vec<(String, serde_json::Value)>> {
    let mut stmt = conn.prepare(
        "SELECT key, body FROM documents
         WHERE collection = ?1 AND json_extract(body, '$.' || ?2) = ?3
         ORDER BY created_at, key",
    )?;
    let rows = stmt.query_map(params![collection, field, value], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (key, body) = row?;
        out.push(parse_body(key, body)?);
    }
    Ok(out)
}

pub fn list_all(
    conn: &Connection,
    collection: &str,
) -> anyhow::Result<Vec<(String, serde_json::Value)>> {
    let mut stmt = conn.prepare(
        "SELECT key, body FROM documents WHERE collection = ?1 ORDER BY created_at, key",
    )?;
    let rows = stmt.query_map(params![collection], |r| {
        Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?))
    })?;
    let mut out = Vec::new();
    for row in rows {
        let (key, body) = row?;
        out.push(parse_body(key, body)?);
    }
    Ok(out)
}

/// Insert a document under a generated key; returns the key.
pub fn insert(
    conn: &Connection,
    collection: &str,
    body: &serde_json::Value,
) -> anyhow::Result<String> {
    let key = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO documents(collection, key, body, created_at) VALUES(?1, ?2, ?3, ?4)",
        params![collection, key, serde_json::to_string(body)?, now_rfc3339()],
    )?;
    Ok(key)
}

/// Upsert many keyed documents in one transaction. A re-run refreshes
/// existing documents in place; created_at keeps the first write's value.
pub fn put_batch(
    conn: &mut Connection,
    collection: &str,
    entries: &[(String, serde_json::Value)],
) -> anyhow::Result<usize> {
    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO documents(collection, key, body, created_at) VALUES(?1, ?2, ?3, ?4)
             ON CONFLICT(collection, key) DO UPDATE SET body = excluded.body",
        )?;
        let created_at = now_rfc3339();
        for (key, body) in entries {
            stmt.execute(params![
                collection,
                key,
                serde_json::to_string(body)?,
                created_at
            ])?;
        }
    }
    tx.commit()?;
    Ok(entries.len())
}
