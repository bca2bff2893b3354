pub mod api;
pub mod core;
pub mod error;
pub mod export;
pub mod kpi;
pub mod markets;
pub mod model;
pub mod pipeline;
pub mod sources;
pub mod utils;
pub mod view;

// Re-exports
pub use crate::core::{Digest, DigestConfig, DigestService};
pub use error::SourceError;
pub use model::IntegratedRecord;
pub use sources::{DataSources, SourceKind};
