//! # counsel-vector
//!
//! Vector search boundary for the career-counsel retrieval core.
//!
//! The production vector database (Qdrant) is an external collaborator;
//! this crate defines the capability the core consumes - filtered cosine
//! search over named collections - plus an in-memory reference store used
//! by tests and local development.
//!
//! ## Modules
//!
//! - [`filter`]: conjunction of equality/membership payload constraints
//! - [`point`]: fragment point and scored-fragment types, payload keys
//! - [`search`]: the `VectorSearch` capability trait
//! - [`memory`]: `InMemoryVectorStore` reference implementation

pub mod error;
pub mod filter;
pub mod memory;
pub mod point;
pub mod search;

pub use error::VectorError;
pub use filter::{Condition, Filter, MatchKind};
pub use memory::InMemoryVectorStore;
pub use point::{payload_keys, CollectionInfo, FragmentPoint, ScoredFragment};
pub use search::VectorSearch;
