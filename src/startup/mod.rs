//! Startup: logging and catalogue bootstrap

pub mod bootstrap;
pub mod logger;

pub use bootstrap::{Catalog, CatalogBuilder};
pub use logger::{build_dispatch, init_logging, StartupLogger};
