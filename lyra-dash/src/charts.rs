//! Chart builders
//!
//! Each builder turns an aggregated table into a serializable chart spec
//! that the browser renders with ECharts. Builders only reshape counts they
//! are given; they never see raw rows.

use serde::Serialize;

use crate::aggregate::{Counts, Matrix};

/// Declarative description of one chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    /// DOM id of the chart container (kebab-case)
    pub id: String,
    pub title: String,
    #[serde(flatten)]
    pub data: ChartData,
    /// Sum of every count shown in the chart
    pub total: u64,
    /// Human-readable total, drawn as the chart subtitle
    pub annotation: String,
}

/// Kind-specific data bindings
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Pie {
        labels: Vec<String>,
        values: Vec<u64>,
    },
    Bar {
        x_label: String,
        y_label: String,
        categories: Vec<String>,
        values: Vec<u64>,
    },
    Treemap {
        nodes: Vec<TreemapNode>,
    },
    Heatmap {
        x_label: String,
        y_label: String,
        x: Vec<String>,
        y: Vec<String>,
        /// `z[y][x]`
        z: Vec<Vec<u64>>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreemapNode {
    pub name: String,
    pub value: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TreemapNode>,
}

impl ChartSpec {
    fn new(id: &str, title: &str, data: ChartData, total: u64) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            data,
            total,
            annotation: format!("Total: {}", total),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self.data {
            ChartData::Pie { .. } => "pie",
            ChartData::Bar { .. } => "bar",
            ChartData::Treemap { .. } => "treemap",
            ChartData::Heatmap { .. } => "heatmap",
        }
    }
}

pub fn pie(id: &str, title: &str, counts: &Counts) -> ChartSpec {
    ChartSpec::new(
        id,
        title,
        ChartData::Pie {
            labels: counts.keys(),
            values: counts.values(),
        },
        counts.total(),
    )
}

pub fn bar(id: &str, title: &str, x_label: &str, y_label: &str, counts: &Counts) -> ChartSpec {
    ChartSpec::new(
        id,
        title,
        ChartData::Bar {
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            categories: counts.keys(),
            values: counts.values(),
        },
        counts.total(),
    )
}

/// Two-level treemap: one parent per group, one leaf per key
///
/// Empty groups are left out.
pub fn treemap(id: &str, title: &str, groups: &[(String, Counts)]) -> ChartSpec {
    let nodes: Vec<TreemapNode> = groups
        .iter()
        .filter(|(_, counts)| !counts.is_empty())
        .map(|(name, counts)| TreemapNode {
            name: name.clone(),
            value: counts.total(),
            children: counts
                .entries()
                .iter()
                .map(|(key, count)| TreemapNode {
                    name: key.clone(),
                    value: *count,
                    children: Vec::new(),
                })
                .collect(),
        })
        .collect();
    let total = nodes.iter().map(|n| n.value).sum();

    ChartSpec::new(id, title, ChartData::Treemap { nodes }, total)
}

/// Heatmap with matrix columns on the x axis and matrix rows on the y axis
pub fn heatmap(id: &str, title: &str, x_label: &str, y_label: &str, matrix: &Matrix) -> ChartSpec {
    ChartSpec::new(
        id,
        title,
        ChartData::Heatmap {
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            x: matrix.columns.clone(),
            y: matrix.rows.clone(),
            z: matrix.cells.clone(),
        },
        matrix.total(),
    )
}
