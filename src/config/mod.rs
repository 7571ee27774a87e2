//! Layered configuration: defaults, local file, credential sources and a
//! remote override with a 24-hour cache.

pub mod credential;
pub mod remote;
pub mod resolver;
pub mod settings;
pub mod store;

pub use credential::{CredentialHelper, GhCliHelper, TOKEN_ENV_VAR};
pub use remote::{HttpRemoteSource, RemoteMessages, RemoteOverride, RemoteSource};
pub use resolver::{ConfigResolver, ResetOutcome};
pub use settings::{ConfigKey, Configuration, ModelTier};
pub use store::ConfigPaths;

#[cfg(test)]
pub use credential::MockCredentialHelper;
#[cfg(test)]
pub use remote::MockRemoteSource;
