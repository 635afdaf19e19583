//! Startup load: fetch every static table, aggregate, build charts

use lyra_common::db::{DataSource, Query};
use lyra_common::Result;
use tracing::info;

use crate::aggregate;
use crate::charts::{self, ChartSpec};

/// Group of charts rendered under one heading
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: String,
    pub title: String,
    pub charts: Vec<ChartSpec>,
}

/// Everything the static page shows
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub title: String,
    pub sections: Vec<Section>,
    /// Options for the singer selector
    pub singer_names: Vec<String>,
}

impl Dashboard {
    pub fn chart_count(&self) -> usize {
        self.sections.iter().map(|s| s.charts.len()).sum()
    }
}

/// Run the static queries and build every chart
///
/// Any fetch failure aborts the load.
pub async fn load_dashboard(source: &dyn DataSource) -> Result<Dashboard> {
    let singers = source.fetch(Query::Singers).await?;
    let projects = source.fetch(Query::Projects).await?;
    let files = source.fetch(Query::ProjectFiles).await?;

    let singer_section = Section {
        id: "singers".to_string(),
        title: "Singers".to_string(),
        charts: vec![
            charts::pie(
                "singer-gender",
                "Singers by gender",
                &aggregate::singer_genders(&singers)?,
            ),
            charts::pie(
                "singer-status",
                "Active singers",
                &aggregate::singer_status(&singers)?,
            ),
        ],
    };

    let project_section = Section {
        id: "projects".to_string(),
        title: "Projects".to_string(),
        charts: vec![
            charts::bar(
                "project-style",
                "Projects by style",
                "Style",
                "Projects",
                &aggregate::projects_by(&projects, "style")?,
            ),
            charts::bar(
                "project-song-type",
                "Projects by song type",
                "Song type",
                "Projects",
                &aggregate::projects_by(&projects, "song_type")?,
            ),
            charts::pie(
                "project-language",
                "Projects by language",
                &aggregate::projects_by(&projects, "language")?,
            ),
            charts::bar(
                "project-month",
                "Projects created per month",
                "Month",
                "Projects",
                &aggregate::projects_per_month(&projects)?,
            ),
        ],
    };

    let file_section = Section {
        id: "files".to_string(),
        title: "Files".to_string(),
        charts: vec![
            charts::pie(
                "file-category",
                "Projects by file category",
                &aggregate::project_file_categories(&files)?,
            ),
            charts::bar(
                "file-type",
                "Projects by file type",
                "File type",
                "Projects",
                &aggregate::project_file_types(&files)?,
            ),
            charts::bar(
                "file-mime",
                "Files by MIME type",
                "MIME type",
                "Files",
                &aggregate::file_mime_types(&files)?,
            ),
            charts::treemap(
                "file-genres",
                "Genres by file category",
                &aggregate::genres_by_category(&files)?,
            ),
            charts::heatmap(
                "file-extensions",
                "File extensions by category",
                "Category",
                "Extension",
                &aggregate::extension_category_matrix(&files)?,
            ),
        ],
    };

    let dashboard = Dashboard {
        title: "Music Project Dashboard".to_string(),
        sections: vec![singer_section, project_section, file_section],
        singer_names: aggregate::singer_names(&singers)?,
    };

    info!(
        "Dashboard loaded: {} charts, {} singers, {} projects, {} files",
        dashboard.chart_count(),
        dashboard.singer_names.len(),
        projects.len(),
        files.len()
    );
    Ok(dashboard)
}
