//! Dashboard aggregates, one per chart

use lyra_common::db::Table;
use lyra_common::Result;
use serde_json::Value;

use super::{
    count_in_order, dedup_by, derive_column, exclude_sentinel, genre_category_triples,
    pivot_counts, value_counts, with_extension_column, Counts, FileCategory, Matrix,
    SCRAPER_SENTINEL,
};

/// Singers per gender, placeholder row excluded
pub fn singer_genders(singers: &Table) -> Result<Counts> {
    let people = exclude_sentinel(singers, "name", SCRAPER_SENTINEL)?;
    value_counts(&people, "gender")
}

/// Active vs inactive singers, placeholder row excluded
pub fn singer_status(singers: &Table) -> Result<Counts> {
    let people = exclude_sentinel(singers, "name", SCRAPER_SENTINEL)?;
    Ok(value_counts(&people, "is_active")?.map_keys(|k| match k {
        "true" => "Active".to_string(),
        "false" => "Inactive".to_string(),
        other => other.to_string(),
    }))
}

/// Singer names for the selector: placeholder removed, sorted, unique
pub fn singer_names(singers: &Table) -> Result<Vec<String>> {
    let people = exclude_sentinel(singers, "name", SCRAPER_SENTINEL)?;
    let mut names = count_in_order(&people, "name")?.keys();
    names.sort();
    Ok(names)
}

/// Projects per value of one project column (style, song_type, language)
pub fn projects_by(projects: &Table, column: &str) -> Result<Counts> {
    value_counts(projects, column)
}

/// Projects created per `YYYY-MM`, oldest month first
pub fn projects_per_month(projects: &Table) -> Result<Counts> {
    let with_month = derive_column(projects, "created_at", "month", |value| {
        value
            .as_str()
            .and_then(month_of)
            .map(Value::String)
            .unwrap_or(Value::Null)
    })?;
    Ok(count_in_order(&with_month, "month")?.sorted_by_key())
}

fn month_of(timestamp: &str) -> Option<String> {
    let prefix = timestamp.get(..7)?;
    chrono::NaiveDate::parse_from_str(&format!("{}-01", prefix), "%Y-%m-%d").ok()?;
    Some(prefix.to_string())
}

/// Projects per file category, counting each project title once
///
/// A project whose files span several categories is counted under the
/// category of its first file. Distinct projects sharing a title are also
/// merged; both are known precision limits of deduplicating by title.
pub fn project_file_categories(project_files: &Table) -> Result<Counts> {
    let projects = dedup_by(project_files, "title")?;
    value_counts(&projects, "file_category")
}

/// Projects per file type, counting each project title once
pub fn project_file_types(project_files: &Table) -> Result<Counts> {
    let projects = dedup_by(project_files, "title")?;
    value_counts(&projects, "file_type")
}

/// Files per MIME type
pub fn file_mime_types(project_files: &Table) -> Result<Counts> {
    value_counts(project_files, "mime_type")
}

/// Normalized genre counts per category, one project per genre and category
pub fn genres_by_category(project_files: &Table) -> Result<Vec<(String, Counts)>> {
    let triples = genre_category_triples(project_files)?;
    let category_idx = triples.column("file_category")?;

    [FileCategory::Deliverable, FileCategory::References]
        .iter()
        .map(|category| {
            let name = category.as_str();
            let rows = triples.filter(|row| row[category_idx].as_str() == Some(name));
            Ok((name.to_string(), value_counts(&rows, "genre")?))
        })
        .collect()
}

/// Files per (extension, category) pair
pub fn extension_category_matrix(project_files: &Table) -> Result<Matrix> {
    let with_ext = with_extension_column(project_files)?;
    pivot_counts(&with_ext, "extension", "file_category")
}

/// Projects per language for one singer
///
/// Matches the singer name exactly and keeps only pairs where the singer's
/// active flag equals the project's. NULL flags never match. The placeholder
/// singer has no languages.
pub fn singer_language_counts(singer_languages: &Table, singer: &str) -> Result<Counts> {
    let pairs = exclude_sentinel(singer_languages, "singer", SCRAPER_SENTINEL)?;
    let singer_idx = pairs.column("singer")?;
    let singer_active = pairs.column("singer_active")?;
    let project_active = pairs.column("project_active")?;

    let rows = pairs.filter(|row| {
        row[singer_idx].as_str() == Some(singer)
            && !row[singer_active].is_null()
            && row[singer_active] == row[project_active]
    });
    value_counts(&rows, "language")
}
