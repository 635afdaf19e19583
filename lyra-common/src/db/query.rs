//! Fixed read queries against the project database
//!
//! No query takes caller-supplied predicates. Column lists are declared here
//! so empty results still carry their column names. Categorical columns may
//! be Postgres enums and are selected as text.

use std::fmt;

/// The embedded read queries the dashboard runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// All singers
    Singers,
    /// All project observations
    Projects,
    /// Every file joined to its owning project
    ProjectFiles,
    /// Singer to project-language pairs through the association table
    SingerLanguages,
}

impl Query {
    pub const ALL: [Query; 4] = [
        Query::Singers,
        Query::Projects,
        Query::ProjectFiles,
        Query::SingerLanguages,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Query::Singers => "singers",
            Query::Projects => "projects",
            Query::ProjectFiles => "project_files",
            Query::SingerLanguages => "singer_languages",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Query::Singers => {
                r#"
                SELECT id, name, gender::text AS gender, is_active
                FROM singers
                ORDER BY name ASC
                "#
            }
            Query::Projects => {
                r#"
                SELECT id, title, style::text AS style, song_type::text AS song_type,
                       genres, language::text AS language, is_active, created_at
                FROM project_observations
                ORDER BY created_at ASC
                "#
            }
            Query::ProjectFiles => {
                r#"
                SELECT p.id AS project_id, p.title, p.genres,
                       f.filename, f.file_path,
                       f.file_category::text AS file_category,
                       f.mime_type::text AS mime_type,
                       f.file_type::text AS file_type
                FROM files f
                JOIN project_observations p ON p.id = f.project_id
                ORDER BY p.id ASC, f.filename ASC
                "#
            }
            Query::SingerLanguages => {
                r#"
                SELECT s.name AS singer, s.is_active AS singer_active,
                       p.language::text AS language, p.is_active AS project_active
                FROM singers s
                JOIN project_singer_association a ON a.singer_id = s.id
                JOIN project_observations p ON p.id = a.project_observation_id
                "#
            }
        }
    }

    /// Result column names, in select order
    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Query::Singers => &["id", "name", "gender", "is_active"],
            Query::Projects => &[
                "id",
                "title",
                "style",
                "song_type",
                "genres",
                "language",
                "is_active",
                "created_at",
            ],
            Query::ProjectFiles => &[
                "project_id",
                "title",
                "genres",
                "filename",
                "file_path",
                "file_category",
                "mime_type",
                "file_type",
            ],
            Query::SingerLanguages => &["singer", "singer_active", "language", "project_active"],
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
