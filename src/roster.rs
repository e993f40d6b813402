use std::path::Path;

/// One student record from the seed roster file.
#[derive(Debug, Clone, PartialEq)]
pub struct RosterStudent {
    pub enrollment: String,
    pub name: String,
    pub grade: String,
}

/// Roster files come straight from the school's export: a JSON array where
/// enrollment and grade may arrive as numbers. Both are stringified, since
/// the enrollment number doubles as the document key.
pub fn parse_roster_file(path: &Path) -> anyhow::Result<Vec<RosterStudent>> {
    let text = std::fs::read_to_string(path)?;
    let value: serde_json::Value = serde_json::from_str(&text)?;
    let Some(items) = value.as_array() else {
        anyhow::bail!("roster file must contain a JSON array");
    };

    let mut out: Vec<RosterStudent> = Vec::with_capacity(items.len());
    for (idx, item) in items.iter().enumerate() {
        let enrollment = string_or_number(item.get("enrollment"));
        let name = item
            .get("name")
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string());
        let grade = string_or_number(item.get("grade"));

        let (Some(enrollment), Some(name), Some(grade)) = (enrollment, name, grade) else {
            anyhow::bail!("roster entry {} is missing enrollment, name or grade", idx);
        };
        if enrollment.is_empty() || name.is_empty() {
            anyhow::bail!("roster entry {} has an empty enrollment or name", idx);
        }
        out.push(RosterStudent {
            enrollment,
            name,
            grade,
        });
    }
    Ok(out)
}

fn string_or_number(v: Option<&serde_json::Value>) -> Option<String> {
    match v {
        Some(serde_json::Value::String(s)) => Some(s.trim().to_string()),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn write_temp_roster(name: &str, content: &str) -> PathBuf {
        let p = std::env::temp_dir().join(format!(
            "{}-{}.json",
            name,
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .expect("clock")
                .as_nanos()
        ));
        std::fs::write(&p, content).expect("write roster");
        p
    }

    #[test]
    fn parses_strings_and_numbers() {
        let p = write_temp_roster(
            "preregd-roster-ok",
            r#"[
                { "enrollment": 200101, "name": "Ana Souza", "grade": 6 },
                { "enrollment": "200102", "name": " Bruno Lima ", "grade": "7" }
            ]"#,
        );
        let students = parse_roster_file(&p).expect("parse");
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].enrollment, "200101");
        assert_eq!(students[0].grade, "6");
        assert_eq!(students[1].name, "Bruno Lima");
        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn rejects_incomplete_entries() {
        let p = write_temp_roster(
            "preregd-roster-bad",
            r#"[ { "enrollment": "200101", "grade": "6" } ]"#,
        );
        let err = parse_roster_file(&p).expect_err("should fail");
        assert!(err.to_string().contains("entry 0"));
        let _ = std::fs::remove_file(p);
    }

    #[test]
    fn rejects_non_array_files() {
        let p = write_temp_roster("preregd-roster-obj", r#"{ "students": [] }"#);
        assert!(parse_roster_file(&p).is_err());
        let _ = std::fs::remove_file(p);
    }
}
