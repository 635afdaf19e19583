//! Genre normalization and the genre / file-category split
//!
//! A project's `genres` field may hold a `|`-separated pair. The first half
//! describes the DELIVERABLE files, the second the REFERENCES files.

use deunicode::deunicode;
use lyra_common::db::{cell_key, Table};
use lyra_common::Result;
use serde_json::Value;
use std::collections::HashSet;

/// File categories that carry a genre
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileCategory {
    Deliverable,
    References,
}

impl FileCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Deliverable => "DELIVERABLE",
            FileCategory::References => "REFERENCES",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "DELIVERABLE" => Some(FileCategory::Deliverable),
            "REFERENCES" => Some(FileCategory::References),
            _ => None,
        }
    }

    /// Position of this category's genre within a `|` pair
    fn slot(&self) -> usize {
        match self {
            FileCategory::Deliverable => 0,
            FileCategory::References => 1,
        }
    }
}

/// Canonical form of a free-text genre
///
/// `;` and `/` separate alternatives and `-` joins words, so
/// `"R&B / Soul"` becomes `"r&b"` and `"Hip-Hop"` becomes `"hip hop"`.
/// Only the first alternative is kept, then folded to plain ASCII.
pub fn normalize_genre(raw: &str) -> String {
    let cleaned = clean_genre(raw);
    // Transliteration can emit separators or capitals; clean once more so
    // the result is a fixed point.
    clean_genre(&deunicode(&cleaned))
}

fn clean_genre(raw: &str) -> String {
    let separated: String = raw
        .chars()
        .map(|c| match c {
            ';' | '/' => ',',
            '-' => ' ',
            other => other,
        })
        .collect();
    let lowered = separated.to_lowercase();
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    let fixed = collapsed.replace("rnb", "r&b");
    fixed.split(',').next().unwrap_or("").trim().to_string()
}

/// Derive `(genre, project_id, file_category)` triples from project files
///
/// Rows whose category is neither DELIVERABLE nor REFERENCES are dropped, as
/// are NULL genres and genres that normalize to nothing. Duplicate triples
/// (several files of one project in one category) collapse to one row.
pub fn genre_category_triples(project_files: &Table) -> Result<Table> {
    let genres_idx = project_files.column("genres")?;
    let project_idx = project_files.column("project_id")?;
    let category_idx = project_files.column("file_category")?;

    let mut out = Table::empty(&["genre", "project_id", "file_category"]);
    let mut seen: HashSet<(String, Option<String>, FileCategory)> = HashSet::new();

    for row in &project_files.rows {
        let Some(category) = row[category_idx].as_str().and_then(FileCategory::parse) else {
            continue;
        };
        let Some(genres) = row[genres_idx].as_str() else {
            continue;
        };

        let parts: Vec<&str> = genres.split('|').collect();
        let raw = if parts.len() >= 2 {
            parts[category.slot()]
        } else {
            genres
        };

        let genre = normalize_genre(raw);
        if genre.is_empty() {
            continue;
        }

        let project = cell_key(&row[project_idx]);
        if seen.insert((genre.clone(), project, category)) {
            out.push_row(vec![
                Value::String(genre),
                row[project_idx].clone(),
                Value::String(category.as_str().to_string()),
            ])?;
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_normalize_known_values() {
        assert_eq!(normalize_genre("R&B / Soul"), "r&b");
        assert_eq!(normalize_genre("Hip-Hop"), "hip hop");
        assert_eq!(normalize_genre("RnB"), "r&b");
        assert_eq!(normalize_genre("  Pop,   Rock "), "pop");
        assert_eq!(normalize_genre("Indie;Folk"), "indie");
        assert_eq!(normalize_genre("Électro   Pop"), "electro pop");
        assert_eq!(normalize_genre("Forró"), "forro");
    }

    #[test]
    fn test_normalize_empty_inputs() {
        assert_eq!(normalize_genre(""), "");
        assert_eq!(normalize_genre(" / "), "");
        assert_eq!(normalize_genre(",rock"), "");
    }

    #[test]
    fn test_normalize_non_latin_is_ascii() {
        let normalized = normalize_genre("Кантри");
        assert!(normalized.is_ascii());
        assert_eq!(normalize_genre(&normalized), normalized);
    }

    proptest! {
        #[test]
        fn prop_normalize_is_idempotent(raw in "\\PC{0,40}") {
            let once = normalize_genre(&raw);
            prop_assert_eq!(normalize_genre(&once), once);
        }

        #[test]
        fn prop_normalize_is_ascii(raw in "\\PC{0,40}") {
            prop_assert!(normalize_genre(&raw).is_ascii());
        }
    }

    fn project_files(rows: Vec<Vec<Value>>) -> Table {
        Table::new(&["project_id", "genres", "file_category"], rows).unwrap()
    }

    #[test]
    fn test_pair_splits_by_category() {
        let files = project_files(vec![
            vec![json!(1), json!("Hip-Hop|R&B / Soul"), json!("DELIVERABLE")],
            vec![json!(1), json!("Hip-Hop|R&B / Soul"), json!("REFERENCES")],
        ]);
        let triples = genre_category_triples(&files).unwrap();
        assert_eq!(
            triples.rows,
            vec![
                vec![json!("hip hop"), json!(1), json!("DELIVERABLE")],
                vec![json!("r&b"), json!(1), json!("REFERENCES")],
            ]
        );
    }

    #[test]
    fn test_unknown_category_dropped() {
        let files = project_files(vec![
            vec![json!(1), json!("Pop|Rock"), json!("STEMS")],
            vec![json!(2), json!("Pop|Rock"), Value::Null],
        ]);
        assert!(genre_category_triples(&files).unwrap().is_empty());
    }

    #[test]
    fn test_single_genre_used_for_either_category() {
        let files = project_files(vec![
            vec![json!(3), json!("Jazz"), json!("DELIVERABLE")],
            vec![json!(3), json!("Jazz"), json!("REFERENCES")],
        ]);
        let triples = genre_category_triples(&files).unwrap();
        assert_eq!(triples.len(), 2);
        assert!(triples.rows.iter().all(|r| r[0] == json!("jazz")));
    }

    #[test]
    fn test_duplicate_files_collapse() {
        let files = project_files(vec![
            vec![json!(4), json!("Pop|Rock"), json!("DELIVERABLE")],
            vec![json!(4), json!("Pop|Rock"), json!("DELIVERABLE")],
            vec![json!(5), json!("Pop|Rock"), json!("DELIVERABLE")],
        ]);
        let triples = genre_category_triples(&files).unwrap();
        assert_eq!(triples.len(), 2);
    }

    #[test]
    fn test_null_and_empty_genres_dropped() {
        let files = project_files(vec![
            vec![json!(6), Value::Null, json!("DELIVERABLE")],
            vec![json!(7), json!(" | "), json!("REFERENCES")],
        ]);
        assert!(genre_category_triples(&files).unwrap().is_empty());
    }
}
