//! Session facade over the relationship graph.
//!
//! Loads every record partition, builds the graph off the async runtime's
//! worker threads, and publishes selection/relationship events for UI
//! components that keep themselves in sync.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::Config;
use crate::error::{RelnavError, Result};
use crate::graph::{classify, EdgeStep, Graph, GraphBuilder, GraphNode, PathResult};
use crate::records::{loader, PersonId, PersonRecord};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Notifications emitted to subscribed UI components.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum NavigatorEvent {
    PersonSelected {
        person_id: PersonId,
        at: DateTime<Utc>,
    },
    RelationshipFound {
        person_a: PersonId,
        person_b: PersonId,
        result: PathResult,
        at: DateTime<Utc>,
    },
}

/// Owns the session graph and the event channel.
pub struct Navigator {
    builder: GraphBuilder,
    graph: Option<Arc<Graph>>,
    events: broadcast::Sender<NavigatorEvent>,
}

impl Navigator {
    pub fn new(builder: GraphBuilder) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            builder,
            graph: None,
            events,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(GraphBuilder::from_config(config))
    }

    /// True once a graph has been fully built. Queries before that fail with
    /// [`RelnavError::GraphNotReady`].
    pub fn is_graph_ready(&self) -> bool {
        self.graph.as_ref().map(|g| g.is_ready()).unwrap_or(false)
    }

    pub fn graph(&self) -> Option<&Arc<Graph>> {
        self.graph.as_ref()
    }

    fn ready_graph(&self) -> Result<&Graph> {
        match self.graph.as_deref() {
            Some(graph) if graph.is_ready() => Ok(graph),
            _ => Err(RelnavError::GraphNotReady),
        }
    }

    /// Subscribe to navigator events. Events sent before subscribing are not replayed.
    pub fn subscribe(&self) -> broadcast::Receiver<NavigatorEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: NavigatorEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    /// Build the graph from an in-memory record set, replacing any previous graph.
    pub fn load_records(&mut self, records: Vec<PersonRecord>) -> &Graph {
        let graph = Arc::new(self.builder.build(records));
        self.graph.insert(graph)
    }

    /// Load every partition under `data_dir` and build the graph.
    ///
    /// The build runs on the blocking pool. On error the previous graph (if
    /// any) is kept.
    pub async fn load_from_dir(&mut self, data_dir: &Path) -> Result<Arc<Graph>> {
        let partitions = loader::load_partitions(data_dir).await?;
        let records = loader::flatten(partitions);

        let builder = self.builder.clone();
        let graph = tokio::task::spawn_blocking(move || builder.build(records))
            .await
            .map_err(|e| RelnavError::Task(format!("graph build failed: {}", e)))?;

        let graph = Arc::new(graph);
        self.graph = Some(Arc::clone(&graph));
        Ok(graph)
    }

    /// Look up a person.
    pub fn get_node(&self, person_id: &PersonId) -> Result<Option<&GraphNode>> {
        Ok(self.ready_graph()?.get_node(person_id))
    }

    /// Mark a person as selected and notify subscribers. Unknown ids return
    /// `Ok(None)` and emit nothing.
    pub fn select_person(&self, person_id: &PersonId) -> Result<Option<&GraphNode>> {
        let node = self.ready_graph()?.get_node(person_id);
        if node.is_some() {
            self.publish(NavigatorEvent::PersonSelected {
                person_id: person_id.clone(),
                at: Utc::now(),
            });
        }
        Ok(node)
    }

    /// Relationship from `a` to `b`; `Ok(None)` when either is unknown or they
    /// are not connected within the search bound.
    pub fn find_relationship(&self, a: &PersonId, b: &PersonId) -> Result<Option<PathResult>> {
        let result = self.ready_graph()?.find_relationship(a, b);
        if let Some(ref found) = result {
            log::debug!("{} -> {}: {} ({} steps)", a, b, found.relationship, found.degree);
            self.publish(NavigatorEvent::RelationshipFound {
                person_a: a.clone(),
                person_b: b.clone(),
                result: found.clone(),
                at: Utc::now(),
            });
        }
        Ok(result)
    }

    /// Label for a path.
    pub fn describe(&self, path: &[EdgeStep]) -> String {
        classify(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn id(s: &str) -> PersonId {
        PersonId::from(s)
    }

    fn records() -> Vec<PersonRecord> {
        vec![
            PersonRecord::new("f", "Fred Hale").with_lineage("Hale"),
            PersonRecord::new("a", "Ann Hale").with_father("Fred Hale"),
            PersonRecord::new("b", "Ben Hale").with_father("Fred Hale"),
        ]
    }

    #[test]
    fn test_not_ready_before_load() {
        let nav = Navigator::new(GraphBuilder::new());
        assert!(!nav.is_graph_ready());
        assert!(matches!(
            nav.find_relationship(&id("a"), &id("b")),
            Err(RelnavError::GraphNotReady)
        ));
        assert!(matches!(nav.select_person(&id("a")), Err(RelnavError::GraphNotReady)));
    }

    #[test]
    fn test_load_records_and_query() {
        let mut nav = Navigator::new(GraphBuilder::new());
        nav.load_records(records());
        assert!(nav.is_graph_ready());
        let result = nav.find_relationship(&id("a"), &id("b")).unwrap().unwrap();
        assert_eq!(result.relationship, "sibling");
        assert_eq!(nav.describe(&result.reverse_path), "sibling");
        assert!(nav.find_relationship(&id("a"), &id("zz")).unwrap().is_none());
        assert!(nav.get_node(&id("zz")).unwrap().is_none());
    }

    #[test]
    fn test_events_published() {
        let mut nav = Navigator::new(GraphBuilder::new());
        nav.load_records(records());
        let mut rx = nav.subscribe();

        nav.select_person(&id("a")).unwrap();
        nav.select_person(&id("missing")).unwrap();
        nav.find_relationship(&id("a"), &id("f")).unwrap();

        match rx.try_recv().unwrap() {
            NavigatorEvent::PersonSelected { person_id, .. } => assert_eq!(person_id, id("a")),
            other => panic!("unexpected event {:?}", other),
        }
        match rx.try_recv().unwrap() {
            NavigatorEvent::RelationshipFound {
                person_a,
                person_b,
                result,
                ..
            } => {
                assert_eq!(person_a, id("a"));
                assert_eq!(person_b, id("f"));
                assert_eq!(result.relationship, "parent");
            }
            other => panic!("unexpected event {:?}", other),
        }
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_load_from_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("hale.json"),
            r#"[
                {"id": "f", "name": "Fred Hale", "lineageName": "Hale"},
                {"id": "a", "name": "Ann Hale", "father": "Fred Hale [Hale]"}
            ]"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("roe.yaml"),
            "- id: r\n  name: Rex Roe\n  spouse: Ann Hale\n",
        )
        .unwrap();

        let mut nav = Navigator::new(GraphBuilder::new());
        let graph = nav.load_from_dir(temp.path()).await.unwrap();
        assert_eq!(graph.len(), 3);
        assert!(nav.is_graph_ready());

        let result = nav.find_relationship(&id("r"), &id("f")).unwrap().unwrap();
        assert_eq!(result.relationship, "parent-in-law");
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_graph() {
        let mut nav = Navigator::new(GraphBuilder::new());
        nav.load_records(records());
        let result = nav.load_from_dir(Path::new("/no/such/partitions")).await;
        assert!(result.is_err());
        assert!(nav.is_graph_ready());
        assert_eq!(nav.graph().unwrap().len(), 3);
    }
}
