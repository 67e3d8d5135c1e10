//! Bounded BFS over the relationship graph.

use std::collections::{HashSet, VecDeque};

use super::{EdgeStep, EdgeType, Graph, PathMap, PathResult};
use crate::records::PersonId;

/// Find the shortest path from `source` to everyone within `max_degree` edges.
///
/// Neighbors are expanded in [`EdgeType::ALL`] order, so when several shortest
/// paths exist the first one in that order wins; only one path per person is
/// reported. The source itself is not in the result. Unknown sources yield an
/// empty map.
pub fn find_paths(graph: &Graph, source: &PersonId, max_degree: usize) -> PathMap {
    let mut result = PathMap::new();
    if !graph.contains(source) {
        return result;
    }

    let mut visited: HashSet<PersonId> = HashSet::new();
    let mut queue: VecDeque<(PersonId, Vec<EdgeStep>)> = VecDeque::new();

    visited.insert(source.clone());
    queue.push_back((source.clone(), Vec::new()));

    while let Some((current, path)) = queue.pop_front() {
        let degree = path.len();
        if degree > max_degree {
            continue;
        }

        // Don't explore further if at max depth
        let expand = degree < max_degree;

        if let Some(node) = graph.get_node(&current) {
            if expand {
                for edge_type in EdgeType::ALL {
                    for neighbor in node.relationships.get(edge_type) {
                        if !visited.insert(neighbor.clone()) {
                            continue;
                        }
                        let mut next = path.clone();
                        next.push(EdgeStep {
                            from: current.clone(),
                            to: neighbor.clone(),
                            edge_type,
                        });
                        queue.push_back((neighbor.clone(), next));
                    }
                }
            }
        }

        if current != *source {
            result.insert(current, PathResult::new(path));
        }
    }

    result
}

/// Reverse a path: steps in opposite order, endpoints swapped, types inverted.
pub fn reverse_path(path: &[EdgeStep]) -> Vec<EdgeStep> {
    path.iter()
        .rev()
        .map(|step| EdgeStep {
            from: step.to.clone(),
            to: step.from.clone(),
            edge_type: step.edge_type.inverse(),
        })
        .collect()
}
