//! authkeep: user-account and credential management.
//!
//! The crate centers on two pieces: a [`credentials::CredentialManager`] that
//! generates salts and hashes/verifies passwords with Argon2id, and an
//! [`services::AccountService`] that sequences lookup, verification, and
//! mutation against a SQLite-backed [`db::Store`].

pub mod config;
pub mod credentials;
pub mod db;
pub mod entities;
pub mod models;
pub mod services;
pub mod validation;

pub use config::Config;
pub use credentials::{CredentialError, CredentialManager, SALT_LENGTH};
pub use db::Store;
pub use models::{Account, LookupKey, NewAccount, Role, RoleQuery, resolve_lookup_key};
pub use services::{AccountError, AccountService, SeaOrmAccountService};

use tracing_subscriber::EnvFilter;

/// Initialize tracing with an env-filter fallback to the configured level.
/// Call once at process startup; the `RUST_LOG` environment variable wins.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
