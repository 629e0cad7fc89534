//! Site configuration.

pub mod loader;
pub mod schema;

pub use loader::{DEFAULT_CONFIG_FILE, resolve};
pub use schema::{ContributorsConfig, RootConfig, SiteConfig};
