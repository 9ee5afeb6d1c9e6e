//! Configuration: typed settings structs plus the Figment-based loader.

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    CloudProviderConfig, Config, HttpConfig, LocalProviderConfig, PathwaysConfig, ProvidersConfig,
    SearchConfig, SearchProviderKind, VaultConfig, Workflow,
};
