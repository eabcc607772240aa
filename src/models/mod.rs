pub mod account;

pub use account::{Account, LookupKey, NewAccount, Role, RoleQuery, resolve_lookup_key};
