//! Page layout as a serializable view-model tree
//!
//! `compose_page` is a pure function of the startup dashboard. The browser
//! walks the tree and mounts one widget per node.

use serde::Serialize;

use crate::charts::ChartSpec;
use crate::dashboard::Dashboard;

/// Dropdown listing singers
pub const SINGER_DROPDOWN: &str = "singer-dropdown";
/// Region holding the per-singer language chart
pub const SINGER_LANGUAGE_REGION: &str = "singer-language-region";

/// One node of the page tree
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    Page {
        title: String,
        children: Vec<Node>,
    },
    Section {
        id: String,
        title: String,
        children: Vec<Node>,
    },
    Heading {
        level: u8,
        text: String,
    },
    Chart {
        chart: ChartSpec,
    },
    Dropdown {
        id: String,
        label: String,
        options: Vec<String>,
        value: Option<String>,
    },
    /// Container whose content is replaced by interaction updates
    Region {
        id: String,
        content: Option<Box<Node>>,
    },
}

impl Node {
    /// Depth-first search for a node carrying the given id
    pub fn find(&self, id: &str) -> Option<&Node> {
        match self {
            Node::Section { id: own, .. } | Node::Dropdown { id: own, .. } | Node::Region { id: own, .. }
                if own == id =>
            {
                Some(self)
            }
            Node::Chart { chart } if chart.id == id => Some(self),
            Node::Page { children, .. } | Node::Section { children, .. } => {
                children.iter().find_map(|child| child.find(id))
            }
            Node::Region {
                content: Some(content),
                ..
            } => content.find(id),
            _ => None,
        }
    }
}

/// Assemble the static page
///
/// Interactive regions start empty; the client fills them by dispatching
/// the dropdown's initial value.
pub fn compose_page(dashboard: &Dashboard) -> Node {
    let mut children = vec![Node::Heading {
        level: 1,
        text: dashboard.title.clone(),
    }];

    for section in &dashboard.sections {
        children.push(Node::Section {
            id: section.id.clone(),
            title: section.title.clone(),
            children: section.charts.iter().map(chart_node).collect(),
        });
    }

    children.push(Node::Section {
        id: "singer-languages".to_string(),
        title: "Languages per singer".to_string(),
        children: vec![
            Node::Dropdown {
                id: SINGER_DROPDOWN.to_string(),
                label: "Singer".to_string(),
                options: dashboard.singer_names.clone(),
                value: dashboard.singer_names.first().cloned(),
            },
            Node::Region {
                id: SINGER_LANGUAGE_REGION.to_string(),
                content: None,
            },
        ],
    });

    Node::Page {
        title: dashboard.title.clone(),
        children,
    }
}

fn chart_node(chart: &ChartSpec) -> Node {
    Node::Chart {
        chart: chart.clone(),
    }
}
