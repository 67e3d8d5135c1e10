pub mod cache;
pub mod config;
pub mod error;
pub mod graph;
pub mod navigator;
pub mod records;

pub use config::Config;
pub use error::{RelnavError, Result};
pub use graph::{build_graph, EdgeStep, EdgeType, Graph, GraphBuilder, GraphNode, PathResult};
pub use navigator::{Navigator, NavigatorEvent};
pub use records::{PersonId, PersonRecord};
