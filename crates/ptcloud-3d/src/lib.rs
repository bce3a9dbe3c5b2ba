#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

mod cache;

/// Index and query configuration.
pub mod config;

/// Error types for point set construction and queries.
pub mod error;

/// The point set container.
pub mod pointset;

/// Neighbor, radius and box queries on point sets.
pub mod query;

pub use config::{IndexConfig, SearchParams};
pub use error::PointSetError;
pub use pointset::{Axis, Organization, PointSet};
pub use ptcloud_index::BoundingBox;
pub use query::SearchStrategy;
