//! Graph view used by every metric.
//!
//! ```text
//! (nodes, edges) from trellis-core
//!        ↓  Adjacency::from_graph()      sorted ids, index-based out/in lists
//!        ├─ components::weak_components()
//!        └─ components::strong_components()   (Kosaraju, iterative)
//! ```

pub mod adjacency;
pub mod components;

pub use adjacency::Adjacency;
pub use components::{strong_components, weak_components};
