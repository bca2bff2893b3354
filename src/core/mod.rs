pub mod config;
pub mod service;
pub mod types;

pub use config::DigestConfig;
pub use service::DigestService;
pub use types::Digest;
