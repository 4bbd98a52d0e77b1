pub mod builder;
pub mod config;
pub mod error;
pub mod layout;
pub mod report;
pub mod scan;
pub mod source;

pub use builder::{build, compose, plan, Atlas, BuildOptions, BuildOutcome, Placement};
pub use error::{AtlasError, Result};
pub use layout::GridLayout;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
