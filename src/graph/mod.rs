//! Relationship graph: reference parsing, graph construction, bounded BFS
//! path search and relationship classification.
//!
//! A `Graph` is built once per session from the full record set and is
//! read-only afterwards, apart from the per-source path cache.

mod builder;
mod classify;
mod parser;
mod traversal;

pub use builder::{build_graph, BuildStats, GraphBuilder};
pub use classify::{classify, classify_types, cousin_pattern, CousinPattern};
pub use parser::{parse_relationship_ref, RelationshipRef};
pub use traversal::{find_paths, reverse_path};

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::cache::PathCache;
use crate::records::{PersonId, PersonRecord};

/// The four relation categories tracked per person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeType {
    Parents,
    Children,
    Spouses,
    Siblings,
}

impl EdgeType {
    /// Neighbor expansion order used by the path finder.
    pub const ALL: [EdgeType; 4] = [
        EdgeType::Parents,
        EdgeType::Children,
        EdgeType::Spouses,
        EdgeType::Siblings,
    ];

    /// Structural inverse: parents <-> children, spouses and siblings are symmetric.
    pub fn inverse(self) -> Self {
        match self {
            EdgeType::Parents => EdgeType::Children,
            EdgeType::Children => EdgeType::Parents,
            EdgeType::Spouses => EdgeType::Spouses,
            EdgeType::Siblings => EdgeType::Siblings,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EdgeType::Parents => "parents",
            EdgeType::Children => "children",
            EdgeType::Spouses => "spouses",
            EdgeType::Siblings => "siblings",
        }
    }

    /// Singular relation name, e.g. `parent` for a `parents` step.
    pub fn singular(self) -> &'static str {
        match self {
            EdgeType::Parents => "parent",
            EdgeType::Children => "child",
            EdgeType::Spouses => "spouse",
            EdgeType::Siblings => "sibling",
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved edges of one person, grouped by edge type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Relationships {
    pub parents: Vec<PersonId>,
    pub children: Vec<PersonId>,
    pub spouses: Vec<PersonId>,
    pub siblings: Vec<PersonId>,
}

impl Relationships {
    pub fn get(&self, edge_type: EdgeType) -> &[PersonId] {
        match edge_type {
            EdgeType::Parents => &self.parents,
            EdgeType::Children => &self.children,
            EdgeType::Spouses => &self.spouses,
            EdgeType::Siblings => &self.siblings,
        }
    }

    fn get_mut(&mut self, edge_type: EdgeType) -> &mut Vec<PersonId> {
        match edge_type {
            EdgeType::Parents => &mut self.parents,
            EdgeType::Children => &mut self.children,
            EdgeType::Spouses => &mut self.spouses,
            EdgeType::Siblings => &mut self.siblings,
        }
    }

    /// Add `id` under `edge_type` unless already present. Returns true if added.
    fn insert(&mut self, edge_type: EdgeType, id: &PersonId) -> bool {
        let list = self.get_mut(edge_type);
        if list.contains(id) {
            return false;
        }
        list.push(id.clone());
        true
    }
}

/// One person plus resolved edges.
#[derive(Debug, Clone)]
pub struct GraphNode {
    pub person: PersonRecord,
    pub relationships: Relationships,
}

impl GraphNode {
    fn new(person: PersonRecord) -> Self {
        Self {
            person,
            relationships: Relationships::default(),
        }
    }

    pub fn id(&self) -> &PersonId {
        &self.person.id
    }
}

/// Normalized name -> candidate ids, in record order.
#[derive(Debug, Clone, Default)]
pub struct NameIndex {
    entries: HashMap<String, Vec<PersonId>>,
}

impl NameIndex {
    /// Lower-case, trim and collapse internal whitespace.
    pub fn normalize(name: &str) -> String {
        name.split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }

    fn insert(&mut self, name: &str, id: PersonId) {
        self.entries.entry(Self::normalize(name)).or_default().push(id);
    }

    /// All people sharing this name.
    pub fn candidates(&self, name: &str) -> &[PersonId] {
        self.entries
            .get(&Self::normalize(name))
            .map(|ids| ids.as_slice())
            .unwrap_or(&[])
    }

    /// Number of distinct names.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names shared by more than one person, with their candidate counts.
    pub fn collisions(&self) -> Vec<(&str, usize)> {
        let mut shared: Vec<_> = self
            .entries
            .iter()
            .filter(|(_, ids)| ids.len() > 1)
            .map(|(name, ids)| (name.as_str(), ids.len()))
            .collect();
        shared.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        shared
    }
}

/// One traversed edge: `to` is in `from`'s `edge_type` list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeStep {
    pub from: PersonId,
    pub to: PersonId,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
}

/// Shortest known path between two people and its classification.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathResult {
    pub path: Vec<EdgeStep>,
    pub degree: usize,
    pub relationship: String,
    pub reverse_path: Vec<EdgeStep>,
}

impl PathResult {
    pub fn new(path: Vec<EdgeStep>) -> Self {
        let reverse_path = reverse_path(&path);
        Self {
            degree: path.len(),
            relationship: classify(&path),
            path,
            reverse_path,
        }
    }

    /// The same relationship seen from the other endpoint.
    pub fn reversed(&self) -> Self {
        Self {
            path: self.reverse_path.clone(),
            degree: self.degree,
            relationship: classify(&self.reverse_path),
            reverse_path: self.path.clone(),
        }
    }
}

/// Paths from one source to every person reachable within the search bound.
pub type PathMap = HashMap<PersonId, PathResult>;

/// The relationship graph for one session.
#[derive(Debug)]
pub struct Graph {
    nodes: HashMap<PersonId, GraphNode>,
    /// Ids in record order; precomputation walks this prefix.
    order: Vec<PersonId>,
    name_index: NameIndex,
    paths: PathCache,
    stats: BuildStats,
    max_degree: usize,
    ready: bool,
}

impl Graph {
    fn empty(max_degree: usize, cache_capacity: usize) -> Self {
        Self {
            nodes: HashMap::new(),
            order: Vec::new(),
            name_index: NameIndex::default(),
            paths: PathCache::new(cache_capacity),
            stats: BuildStats::default(),
            max_degree,
            ready: false,
        }
    }

    /// True once every build pass up to sibling derivation has run.
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    pub fn get_node(&self, id: &PersonId) -> Option<&GraphNode> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Person ids in record order.
    pub fn person_ids(&self) -> &[PersonId] {
        &self.order
    }

    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.order.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn name_index(&self) -> &NameIndex {
        &self.name_index
    }

    pub fn stats(&self) -> &BuildStats {
        &self.stats
    }

    pub fn max_degree(&self) -> usize {
        self.max_degree
    }

    pub fn path_cache(&self) -> &PathCache {
        &self.paths
    }

    /// Resolve a parsed reference to a person id, see [`GraphBuilder`] for the policy.
    pub fn resolve_person_ref(&self, reference: &RelationshipRef) -> Option<PersonId> {
        builder::resolve(&self.name_index, &self.nodes, reference).person_id()
    }

    /// Path map for `source`, served from the cache or computed and cached.
    pub fn paths_from(&self, source: &PersonId) -> Arc<PathMap> {
        if let Some(map) = self.paths.get(source) {
            return map;
        }
        let map = Arc::new(find_paths(self, source, self.max_degree));
        self.paths.put(source.clone(), Arc::clone(&map));
        map
    }

    /// Shortest relationship from `a` to `b` within the search bound.
    ///
    /// Returns `None` for unknown ids and for people not connected within
    /// `max_degree` edges. Cached maps for either endpoint are used before
    /// falling back to a search from `a`.
    pub fn find_relationship(&self, a: &PersonId, b: &PersonId) -> Option<PathResult> {
        if !self.contains(a) || !self.contains(b) {
            return None;
        }
        if a == b {
            return Some(PathResult::new(Vec::new()));
        }

        if let Some(map) = self.paths.get(a) {
            return map.get(b).cloned();
        }
        // Edges are bidirectional, so distance is symmetric: b's map answers for a too.
        if let Some(map) = self.paths.get(b) {
            return map.get(a).map(PathResult::reversed);
        }

        self.paths_from(a).get(b).cloned()
    }

    /// Display name of a person, falling back to the id.
    pub fn display_name(&self, id: &PersonId) -> String {
        self.nodes
            .get(id)
            .map(|n| n.person.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    /// Render a path as a chain of names, e.g. `Ann -[parent]-> Bob -[sibling]-> Cy`.
    pub fn describe_path(&self, path: &[EdgeStep]) -> String {
        let Some(first) = path.first() else {
            return String::new();
        };
        let mut out = self.display_name(&first.from);
        for step in path {
            out.push_str(&format!(
                " -[{}]-> {}",
                step.edge_type.singular(),
                self.display_name(&step.to)
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> PersonId {
        PersonId::from(s)
    }

    /// Grandparents G1/G2; their children Mom and Aunt; Mom + Dad have Ann and Ben;
    /// Aunt has Dee.
    fn family() -> Graph {
        build_graph(family_records())
    }

    #[test]
    fn test_edge_type_inverse() {
        for t in EdgeType::ALL {
            assert_eq!(t.inverse().inverse(), t);
        }
        assert_eq!(EdgeType::Parents.inverse(), EdgeType::Children);
        assert_eq!(EdgeType::Spouses.inverse(), EdgeType::Spouses);
    }

    #[test]
    fn test_name_index_normalizes() {
        let mut index = NameIndex::default();
        index.insert("  Jane   Doe ", id("1"));
        index.insert("jane doe", id("2"));
        assert_eq!(index.candidates("JANE DOE"), &[id("1"), id("2")]);
        assert_eq!(index.collisions(), vec![("jane doe", 2)]);
        assert!(index.candidates("John Doe").is_empty());
    }

    #[test]
    fn test_sibling_scenario() {
        let graph = family();
        let result = graph.find_relationship(&id("ann"), &id("ben")).unwrap();
        assert_eq!(result.relationship, "sibling");
        assert_eq!(result.degree, 1);
    }

    #[test]
    fn test_aunt_and_cousin_scenarios() {
        let graph = family();
        let aunt = graph.find_relationship(&id("ann"), &id("aunt")).unwrap();
        assert_eq!(aunt.relationship, "aunt/uncle");
        let cousin = graph.find_relationship(&id("ann"), &id("dee")).unwrap();
        assert_eq!(cousin.relationship, "first cousin");
        assert_eq!(cousin.degree, 3);
    }

    #[test]
    fn test_unknown_ids_return_none() {
        let graph = family();
        assert!(graph.find_relationship(&id("ann"), &id("nobody")).is_none());
        assert!(graph.find_relationship(&id("nobody"), &id("ann")).is_none());
        assert!(graph.get_node(&id("nobody")).is_none());
    }

    #[test]
    fn test_self_relationship() {
        let graph = family();
        let result = graph.find_relationship(&id("ann"), &id("ann")).unwrap();
        assert_eq!(result.degree, 0);
        assert_eq!(result.relationship, "self");
    }

    #[test]
    fn test_reverse_served_from_other_endpoint_cache() {
        let graph = GraphBuilder::new().with_precompute_limit(0).build(family_records());
        // Warm only Gus's map, then ask from the grandchild's side.
        let forward = graph.find_relationship(&id("g1"), &id("ann")).unwrap();
        assert_eq!(forward.relationship, "grandchild");
        assert_eq!(graph.path_cache().len(), 1);

        let backward = graph.find_relationship(&id("ann"), &id("g1")).unwrap();
        assert_eq!(backward.relationship, "grandparent");
        assert_eq!(backward.path, forward.reverse_path);
        assert_eq!(graph.path_cache().len(), 1);
    }

    #[test]
    fn test_cached_and_uncached_answers_agree() {
        let cold = GraphBuilder::new().with_precompute_limit(0).build(family_records());
        let warm = GraphBuilder::new().with_precompute_limit(100).build(family_records());
        assert!(cold.path_cache().is_empty());
        assert_eq!(warm.path_cache().len(), 8);
        for a in cold.person_ids() {
            for b in cold.person_ids() {
                let x = cold.find_relationship(a, b).map(|r| (r.degree, r.relationship));
                let y = warm.find_relationship(a, b).map(|r| (r.degree, r.relationship));
                assert_eq!(x, y, "{} -> {}", a, b);
            }
        }
    }

    #[test]
    fn test_describe_path_names() {
        let graph = family();
        let result = graph.find_relationship(&id("ann"), &id("aunt")).unwrap();
        assert_eq!(
            graph.describe_path(&result.path),
            "Ann Roe -[parent]-> Mia Hale -[sibling]-> Ada Hale"
        );
        assert_eq!(graph.describe_path(&[]), "");
    }

    fn family_records() -> Vec<PersonRecord> {
        vec![
            PersonRecord::new("g1", "Gus Hale"),
            PersonRecord::new("g2", "Gia Hale").with_spouse("Gus Hale"),
            PersonRecord::new("mom", "Mia Hale")
                .with_father("Gus Hale")
                .with_mother("Gia Hale"),
            PersonRecord::new("aunt", "Ada Hale")
                .with_father("Gus Hale")
                .with_mother("Gia Hale"),
            PersonRecord::new("dad", "Dan Roe").with_spouse("Mia Hale"),
            PersonRecord::new("ann", "Ann Roe")
                .with_father("Dan Roe")
                .with_mother("Mia Hale"),
            PersonRecord::new("ben", "Ben Roe")
                .with_father("Dan Roe")
                .with_mother("Mia Hale"),
            PersonRecord::new("dee", "Dee Hale").with_mother("Ada Hale"),
        ]
    }
}
