//! Bundle and host configuration
//!
//! Provides:
//! - `BundleConfigurationBuilder` / `BundleConfiguration`: where the stream
//!   servlet goes and whether the metrics publisher is installed
//! - `Configuration` / `BaseConfiguration`: the host's runtime configuration
//! - `load_from_file`: TOML, YAML or JSON loading

mod builder;
mod bundle_config;
mod file_loader;
mod settings;


pub use builder::BundleConfigurationBuilder;
pub use bundle_config::{
    BundleConfiguration, DEFAULT_STREAM_PATH, MetricsPublisherPredicate, SERVLET_NAME,
    StreamTarget, validate_stream_path,
};
pub use file_loader::load_from_file;
pub use settings::{BaseConfiguration, BundleSettings, Configuration, ServerSettings, TargetKind};
