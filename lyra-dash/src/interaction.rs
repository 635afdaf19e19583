//! Dropdown-driven region updates
//!
//! Handlers are registered explicitly per control id. Dispatch is
//! serialized: one update runs to completion (fetch, aggregate, render)
//! before the next starts, so the handler is always either idle or running
//! exactly one update.

use async_trait::async_trait;
use lyra_common::db::{DataSource, Query};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;
use tracing::{error, info};

use crate::aggregate;
use crate::charts;
use crate::layout::{Node, SINGER_DROPDOWN, SINGER_LANGUAGE_REGION};

/// Renders the content of one region for a control value
#[async_trait]
pub trait RegionHandler: Send + Sync {
    /// Region whose content this handler replaces
    fn region_id(&self) -> &str;

    async fn render(&self, source: &dyn DataSource, value: &str) -> lyra_common::Result<Node>;
}

/// Bar chart of project languages for the selected singer
///
/// Re-fetches the full singer/language join on every call and filters it in
/// memory.
pub struct SingerLanguageHandler;

#[async_trait]
impl RegionHandler for SingerLanguageHandler {
    fn region_id(&self) -> &str {
        SINGER_LANGUAGE_REGION
    }

    async fn render(&self, source: &dyn DataSource, value: &str) -> lyra_common::Result<Node> {
        let pairs = source.fetch(Query::SingerLanguages).await?;
        let counts = aggregate::singer_language_counts(&pairs, value)?;
        let chart = charts::bar(
            "singer-language-chart",
            &format!("Projects by language for {}", value),
            "Language",
            "Projects",
            &counts,
        );
        Ok(Node::Chart { chart })
    }
}

/// Observable dispatcher state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum HandlerState {
    Idle,
    Updating { control: String, value: String },
}

/// Replacement content for one region
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionUpdate {
    pub region_id: String,
    pub content: Node,
}

#[derive(Error, Debug)]
pub enum InteractionError {
    #[error("No handler registered for control: {0}")]
    UnknownControl(String),

    #[error(transparent)]
    Data(#[from] lyra_common::Error),
}

/// Registry of control handlers sharing one data source
pub struct Interactions {
    source: Arc<dyn DataSource>,
    handlers: HashMap<String, Box<dyn RegionHandler>>,
    state: Mutex<HandlerState>,
    /// Held for the whole of an update; also records the last value
    /// rendered per control.
    selections: tokio::sync::Mutex<HashMap<String, String>>,
}

impl Interactions {
    pub fn new(source: Arc<dyn DataSource>) -> Self {
        Self {
            source,
            handlers: HashMap::new(),
            state: Mutex::new(HandlerState::Idle),
            selections: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Register the handler for a control
    pub fn on<H>(mut self, control: &str, handler: H) -> Self
    where
        H: RegionHandler + 'static,
    {
        self.handlers.insert(control.to_string(), Box::new(handler));
        self
    }

    /// The dashboard's bindings: singer dropdown drives the language region
    pub fn dashboard(source: Arc<dyn DataSource>) -> Self {
        Self::new(source).on(SINGER_DROPDOWN, SingerLanguageHandler)
    }

    pub fn state(&self) -> HandlerState {
        lock(&self.state).clone()
    }

    /// Last value successfully rendered for a control
    pub async fn selected(&self, control: &str) -> Option<String> {
        self.selections.lock().await.get(control).cloned()
    }

    /// Handle a control value change and return the region's new content
    pub async fn dispatch(
        &self,
        control: &str,
        value: &str,
    ) -> Result<RegionUpdate, InteractionError> {
        let handler = self
            .handlers
            .get(control)
            .ok_or_else(|| InteractionError::UnknownControl(control.to_string()))?;

        let mut selections = self.selections.lock().await;

        let content = {
            let _updating = UpdatingGuard::enter(&self.state, control, value);
            handler.render(self.source.as_ref(), value).await
        };
        let content = content.map_err(|e| {
            error!("Update for {}={} failed: {}", control, value, e);
            e
        })?;

        selections.insert(control.to_string(), value.to_string());

        if let Node::Chart { chart } = &content {
            info!("{} changed to '{}': total {}", control, value, chart.total);
        }

        Ok(RegionUpdate {
            region_id: handler.region_id().to_string(),
            content,
        })
    }
}

fn lock(state: &Mutex<HandlerState>) -> MutexGuard<'_, HandlerState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Marks the dispatcher as updating until dropped, including on
/// cancellation
struct UpdatingGuard<'a> {
    state: &'a Mutex<HandlerState>,
}

impl<'a> UpdatingGuard<'a> {
    fn enter(state: &'a Mutex<HandlerState>, control: &str, value: &str) -> Self {
        *lock(state) = HandlerState::Updating {
            control: control.to_string(),
            value: value.to_string(),
        };
        Self { state }
    }
}

impl Drop for UpdatingGuard<'_> {
    fn drop(&mut self) {
        *lock(self.state) = HandlerState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::ChartData;
    use lyra_common::db::{StaticSource, Table};
    use serde_json::json;

    fn alice_source() -> Arc<StaticSource> {
        let pairs = Table::new(
            Query::SingerLanguages.columns(),
            vec![
                vec![json!("Alice"), json!(true), json!("EN"), json!(true)],
                vec![json!("Alice"), json!(true), json!("EN"), json!(true)],
                vec![json!("Alice"), json!(true), json!("FR"), json!(true)],
                vec![json!("Bob"), json!(true), json!("DE"), json!(true)],
                vec![json!("scraper"), json!(true), json!("EN"), json!(true)],
                vec![json!("scraper"), json!(true), json!("FR"), json!(true)],
            ],
        )
        .unwrap();
        Arc::new(StaticSource::new().with(Query::SingerLanguages, pairs))
    }

    #[tokio::test]
    async fn test_alice_renders_language_bars() {
        let interactions = Interactions::dashboard(alice_source());
        let update = interactions.dispatch(SINGER_DROPDOWN, "Alice").await.unwrap();

        assert_eq!(update.region_id, SINGER_LANGUAGE_REGION);
        let Node::Chart { chart } = update.content else {
            panic!("expected a chart");
        };
        assert_eq!(chart.total, 3);
        assert_eq!(chart.annotation, "Total: 3");
        match chart.data {
            ChartData::Bar { categories, values, .. } => {
                assert_eq!(categories, vec!["EN", "FR"]);
                assert_eq!(values, vec![2, 1]);
            }
            other => panic!("unexpected chart data: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_singer_renders_empty_chart() {
        let interactions = Interactions::dashboard(alice_source());
        let update = interactions.dispatch(SINGER_DROPDOWN, "Zed").await.unwrap();
        let Node::Chart { chart } = update.content else {
            panic!("expected a chart");
        };
        assert_eq!(chart.total, 0);
    }

    #[tokio::test]
    async fn test_placeholder_singer_renders_empty_chart() {
        let interactions = Interactions::dashboard(alice_source());
        let update = interactions.dispatch(SINGER_DROPDOWN, "scraper").await.unwrap();
        let Node::Chart { chart } = update.content else {
            panic!("expected a chart");
        };
        assert_eq!(chart.total, 0);
        assert_eq!(chart.annotation, "Total: 0");
    }

    #[tokio::test]
    async fn test_every_change_refetches() {
        let source = alice_source();
        let interactions = Interactions::dashboard(source.clone());
        interactions.dispatch(SINGER_DROPDOWN, "Alice").await.unwrap();
        interactions.dispatch(SINGER_DROPDOWN, "Bob").await.unwrap();
        interactions.dispatch(SINGER_DROPDOWN, "Alice").await.unwrap();
        assert_eq!(source.fetch_count(), 3);
    }

    #[tokio::test]
    async fn test_unknown_control_is_rejected() {
        let interactions = Interactions::dashboard(alice_source());
        let err = interactions.dispatch("year-slider", "2024").await.unwrap_err();
        assert!(matches!(err, InteractionError::UnknownControl(_)));
    }

    #[tokio::test]
    async fn test_state_returns_to_idle_and_records_selection() {
        let interactions = Interactions::dashboard(alice_source());
        assert_eq!(interactions.state(), HandlerState::Idle);
        interactions.dispatch(SINGER_DROPDOWN, "Bob").await.unwrap();
        assert_eq!(interactions.state(), HandlerState::Idle);
        assert_eq!(
            interactions.selected(SINGER_DROPDOWN).await.as_deref(),
            Some("Bob")
        );
    }

    struct FailingSource;

    #[async_trait]
    impl DataSource for FailingSource {
        async fn fetch(&self, _query: Query) -> lyra_common::Result<Table> {
            Err(lyra_common::Error::Internal("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_failed_update_keeps_previous_selection() {
        let interactions = Interactions::dashboard(Arc::new(FailingSource));
        let err = interactions.dispatch(SINGER_DROPDOWN, "Alice").await.unwrap_err();
        assert!(matches!(err, InteractionError::Data(_)));
        assert_eq!(interactions.state(), HandlerState::Idle);
        assert!(interactions.selected(SINGER_DROPDOWN).await.is_none());
    }

    struct EchoHandler;

    #[async_trait]
    impl RegionHandler for EchoHandler {
        fn region_id(&self) -> &str {
            "echo-region"
        }

        async fn render(&self, _source: &dyn DataSource, value: &str) -> lyra_common::Result<Node> {
            Ok(Node::Heading {
                level: 2,
                text: value.to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_custom_handler_registration() {
        let interactions =
            Interactions::new(Arc::new(StaticSource::new())).on("echo", EchoHandler);
        let update = interactions.dispatch("echo", "hello").await.unwrap();
        assert_eq!(update.region_id, "echo-region");
        assert_eq!(
            update.content,
            Node::Heading {
                level: 2,
                text: "hello".to_string()
            }
        );
    }
}
