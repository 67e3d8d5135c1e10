//! Graph construction from person records.
//!
//! Construction runs in passes because references can point at people that
//! appear later in the record list:
//! 1. create every node and fill the name index
//! 2. resolve parent, spouse and child references into bidirectional edges
//! 3. derive siblings from shared parents
//! 4. optionally precompute path maps for the first N people

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::{
    find_paths, parse_relationship_ref, EdgeType, Graph, GraphNode, NameIndex, RelationshipRef,
};
use crate::config::{CacheConfig, Config, GraphConfig};
use crate::records::{dedup_by_id, PersonId, PersonRecord};

/// Counters collected while building, for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildStats {
    pub records_accepted: usize,
    pub records_rejected: usize,
    pub references_resolved: usize,
    pub references_unresolved: usize,
    /// Ambiguous names resolved to the first candidate.
    pub ambiguous_fallbacks: usize,
    /// References that resolved to the person holding them.
    pub self_references: usize,
    pub parent_edges: usize,
    pub spouse_edges: usize,
    pub sibling_edges: usize,
    pub precomputed_sources: usize,
}

/// Outcome of resolving one reference against the name index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    /// Exactly one person carries the name.
    Unique(PersonId),
    /// Several share the name; the lineage qualifier picked one.
    ByLineage(PersonId),
    /// Several share the name and the lineage did not single one out.
    Fallback(PersonId),
    Unresolved,
}

impl Resolution {
    pub(crate) fn person_id(self) -> Option<PersonId> {
        match self {
            Resolution::Unique(id) | Resolution::ByLineage(id) | Resolution::Fallback(id) => Some(id),
            Resolution::Unresolved => None,
        }
    }
}

fn same_lineage(a: &str, b: &str) -> bool {
    NameIndex::normalize(a) == NameIndex::normalize(b)
}

/// Resolve a reference by name, using the lineage to break ties.
///
/// Best-effort: when several people share a name and the lineage does not
/// pick exactly one, the first candidate in record order is used.
pub(crate) fn resolve(
    index: &NameIndex,
    nodes: &HashMap<PersonId, GraphNode>,
    reference: &RelationshipRef,
) -> Resolution {
    let candidates: Vec<&PersonId> = index
        .candidates(&reference.name)
        .iter()
        .filter(|id| nodes.contains_key(*id))
        .collect();

    match candidates.as_slice() {
        [] => Resolution::Unresolved,
        [only] => Resolution::Unique((*only).clone()),
        [first, ..] => {
            if let Some(lineage) = reference.lineage.as_deref() {
                let matching: Vec<&PersonId> = candidates
                    .iter()
                    .copied()
                    .filter(|id| {
                        nodes[*id]
                            .person
                            .lineage_name
                            .as_deref()
                            .map(|l| same_lineage(l, lineage))
                            .unwrap_or(false)
                    })
                    .collect();
                if let [only] = matching.as_slice() {
                    return Resolution::ByLineage((*only).clone());
                }
            }
            Resolution::Fallback((*first).clone())
        }
    }
}

/// A child entry: a direct id link, or a free-text reference.
enum ChildLink {
    Id(PersonId),
    Reference(RelationshipRef),
}

/// References held by one person, waiting for every node to exist.
struct PendingRefs {
    person: PersonId,
    parents: Vec<RelationshipRef>,
    spouses: Vec<RelationshipRef>,
    children: Vec<String>,
}

impl PendingRefs {
    fn from_record(record: &PersonRecord) -> Self {
        let parents = [record.father.as_deref(), record.mother.as_deref()]
            .into_iter()
            .flatten()
            .filter_map(parse_relationship_ref)
            .collect();
        let spouses = record
            .spouses
            .iter()
            .filter_map(|s| parse_relationship_ref(s))
            .collect();
        Self {
            person: record.id.clone(),
            parents,
            spouses,
            children: record.children.clone(),
        }
    }
}

/// Builds a [`Graph`] from person records.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    max_degree: usize,
    precompute_limit: usize,
    cache_capacity: usize,
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphBuilder {
    /// Builder with the default search bound, precompute limit and cache size.
    pub fn new() -> Self {
        Self::with_settings(&GraphConfig::default(), &CacheConfig::default())
    }

    pub fn from_config(config: &Config) -> Self {
        Self::with_settings(&config.graph, &config.cache)
    }

    pub fn with_settings(graph: &GraphConfig, cache: &CacheConfig) -> Self {
        Self {
            max_degree: graph.max_degree,
            precompute_limit: graph.precompute_limit,
            cache_capacity: cache.capacity,
        }
    }

    pub fn with_max_degree(mut self, max_degree: usize) -> Self {
        self.max_degree = max_degree;
        self
    }

    pub fn with_precompute_limit(mut self, limit: usize) -> Self {
        self.precompute_limit = limit;
        self
    }

    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    /// Run every construction pass and return a ready graph.
    ///
    /// Invalid and duplicate records are logged and skipped; unresolvable
    /// references are dropped. Neither fails the build.
    pub fn build(&self, records: impl IntoIterator<Item = PersonRecord>) -> Graph {
        let mut graph = Graph::empty(self.max_degree, self.cache_capacity);

        let mut valid = Vec::new();
        for record in records {
            match record.validate() {
                Ok(()) => valid.push(record),
                Err(e) => {
                    log::warn!("Rejected record: {}", e);
                    graph.stats.records_rejected += 1;
                }
            }
        }
        let (records, duplicates) = dedup_by_id(valid);
        graph.stats.records_rejected += duplicates;

        let pending = add_nodes(&mut graph, records);
        resolve_edges(&mut graph, &pending);
        derive_siblings(&mut graph);
        count_edges(&mut graph);
        graph.ready = true;

        // Never precompute more sources than the cache holds
        let precompute_limit = self.precompute_limit.min(graph.paths.capacity());
        if precompute_limit > 0 {
            precompute_paths(&graph, precompute_limit);
            graph.stats.precomputed_sources = graph.paths.len();
        }

        let stats = &graph.stats;
        log::info!(
            "Relationship graph ready: {} people, {} parent, {} spouse, {} sibling edges ({} references unresolved)",
            stats.records_accepted,
            stats.parent_edges,
            stats.spouse_edges,
            stats.sibling_edges,
            stats.references_unresolved
        );
        graph
    }
}

/// Build a graph with default settings.
pub fn build_graph(records: impl IntoIterator<Item = PersonRecord>) -> Graph {
    GraphBuilder::new().build(records)
}

/// Pass 1: one node per record, name index, pending references.
fn add_nodes(graph: &mut Graph, records: Vec<PersonRecord>) -> Vec<PendingRefs> {
    let mut pending = Vec::with_capacity(records.len());
    for record in records {
        pending.push(PendingRefs::from_record(&record));
        graph.name_index.insert(&record.name, record.id.clone());
        graph.order.push(record.id.clone());
        graph.nodes.insert(record.id.clone(), GraphNode::new(record));
    }
    graph.stats.records_accepted = graph.order.len();
    pending
}

fn resolve_counted(graph: &mut Graph, holder: &PersonId, reference: &RelationshipRef) -> Option<PersonId> {
    let resolution = resolve(&graph.name_index, &graph.nodes, reference);
    match &resolution {
        Resolution::Unresolved => {
            log::debug!("{}: no person named '{}'", holder, reference.name);
            graph.stats.references_unresolved += 1;
            return None;
        }
        Resolution::Fallback(id) => {
            log::debug!(
                "{}: '{}' is ambiguous, using first candidate {}",
                holder,
                reference.name,
                id
            );
            graph.stats.ambiguous_fallbacks += 1;
        }
        Resolution::Unique(_) | Resolution::ByLineage(_) => {}
    }

    let id = resolution.person_id()?;
    if &id == holder {
        log::debug!("{}: dropping reference to self ('{}')", holder, reference.name);
        graph.stats.self_references += 1;
        return None;
    }
    graph.stats.references_resolved += 1;
    Some(id)
}

/// Add `parent` as a parent of `child`, with the reverse child edge.
fn link_parent(graph: &mut Graph, child: &PersonId, parent: &PersonId) {
    if let Some(node) = graph.nodes.get_mut(child) {
        node.relationships.insert(EdgeType::Parents, parent);
    }
    if let Some(node) = graph.nodes.get_mut(parent) {
        node.relationships.insert(EdgeType::Children, child);
    }
}

fn link_spouses(graph: &mut Graph, a: &PersonId, b: &PersonId) {
    if let Some(node) = graph.nodes.get_mut(a) {
        node.relationships.insert(EdgeType::Spouses, b);
    }
    if let Some(node) = graph.nodes.get_mut(b) {
        node.relationships.insert(EdgeType::Spouses, a);
    }
}

/// Pass 2: resolve references into bidirectional edges.
fn resolve_edges(graph: &mut Graph, pending: &[PendingRefs]) {
    for refs in pending {
        let person = &refs.person;

        for reference in &refs.parents {
            if let Some(parent) = resolve_counted(graph, person, reference) {
                link_parent(graph, person, &parent);
            }
        }

        for reference in &refs.spouses {
            if let Some(spouse) = resolve_counted(graph, person, reference) {
                link_spouses(graph, person, &spouse);
            }
        }

        for entry in &refs.children {
            let link = if graph.nodes.contains_key(&PersonId::new(entry.as_str())) {
                ChildLink::Id(PersonId::new(entry.as_str()))
            } else {
                match parse_relationship_ref(entry) {
                    Some(reference) => ChildLink::Reference(reference),
                    None => continue,
                }
            };
            let child = match link {
                ChildLink::Id(id) if &id == person => {
                    graph.stats.self_references += 1;
                    None
                }
                ChildLink::Id(id) => {
                    graph.stats.references_resolved += 1;
                    Some(id)
                }
                ChildLink::Reference(reference) => resolve_counted(graph, person, &reference),
            };
            if let Some(child) = child {
                link_parent(graph, &child, person);
            }
        }
    }
}

/// Pass 3: siblings are the other children of each parent.
fn derive_siblings(graph: &mut Graph) {
    let mut derived: Vec<(PersonId, Vec<PersonId>)> = Vec::new();

    for id in &graph.order {
        let node = &graph.nodes[id];
        let mut siblings: Vec<PersonId> = Vec::new();
        for parent in &node.relationships.parents {
            let Some(parent_node) = graph.nodes.get(parent) else {
                continue;
            };
            for child in &parent_node.relationships.children {
                if child != id && !siblings.contains(child) {
                    siblings.push(child.clone());
                }
            }
        }
        derived.push((id.clone(), siblings));
    }

    for (id, siblings) in derived {
        if let Some(node) = graph.nodes.get_mut(&id) {
            node.relationships.siblings = siblings;
        }
    }
}

fn count_edges(graph: &mut Graph) {
    let (mut parents, mut spouses, mut siblings) = (0, 0, 0);
    for node in graph.nodes.values() {
        parents += node.relationships.parents.len();
        spouses += node.relationships.spouses.len();
        siblings += node.relationships.siblings.len();
    }
    graph.stats.parent_edges = parents;
    // Symmetric relations are stored on both endpoints.
    graph.stats.spouse_edges = spouses / 2;
    graph.stats.sibling_edges = siblings / 2;
}

/// Pass 4: warm the path cache for a prefix of people in record order.
fn precompute_paths(graph: &Graph, limit: usize) {
    for source in graph.order.iter().take(limit) {
        let map = find_paths(graph, source, graph.max_degree);
        graph.paths.put(source.clone(), Arc::new(map));
    }
    log::debug!("Precomputed path maps for {} people", graph.paths.len());
}
