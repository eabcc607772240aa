//! Domain types for accounts, roles, and lookup-key resolution.

use regex::Regex;
use std::sync::OnceLock;

use crate::entities::{accounts, roles};

/// Account data returned to callers (never carries the password hash).
#[derive(Debug, Clone)]
pub struct Account {
    /// `None` until the account has been persisted.
    pub id: Option<i32>,
    pub username: String,
    pub email: String,
    pub login_count: i32,
    /// Epoch seconds of the last successful login.
    pub last_login_at: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<accounts::Model> for Account {
    fn from(model: accounts::Model) -> Self {
        Self {
            id: Some(model.id),
            username: model.username,
            email: model.email,
            login_count: model.login_count,
            last_login_at: model.last_login_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Role {
    pub id: i32,
    pub name: String,
}

impl From<roles::Model> for Role {
    fn from(model: roles::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
        }
    }
}

/// Input for account registration. The salt is optional; a fresh one is
/// generated during the before-save pipeline when absent.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: String,
    pub salt: Option<String>,
}

/// The column an ambiguous lookup value resolves against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKey {
    Email,
    Username,
    Id,
}

impl LookupKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Username => "username",
            Self::Id => "id",
        }
    }
}

/// A role reference for membership checks: by loaded role, by name, or by id.
#[derive(Debug, Clone)]
pub enum RoleQuery {
    Ref(Role),
    Name(String),
    Id(i32),
}

fn email_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^[-_a-z0-9'+*$^&%=~!?{}]+(?:\.[-_a-z0-9'+*$^&%=~!?{}]+)*@(?:(?:[-a-z0-9]+\.)+[a-z]{2,6}|(?:\d{1,3}\.){3}\d{1,3})(?::\d+)?$",
        )
        .expect("Invalid regex")
    })
}

/// RFC-ish email check: named hosts or IPv4 literals, with an optional
/// `:port` suffix, matching the legacy validator's shape.
#[must_use]
pub fn is_email(value: &str) -> bool {
    email_regex().is_match(value)
}

/// Classifies an ambiguous identifier into the column to match against.
///
/// Email-shaped values resolve to [`LookupKey::Email`], other non-numeric
/// strings to [`LookupKey::Username`], and anything that parses as an integer
/// to [`LookupKey::Id`]. Known quirk carried over from the legacy classifier:
/// an all-digit username like "12345" resolves to `Id` and can therefore never
/// be looked up by name.
#[must_use]
pub fn resolve_lookup_key(value: &str) -> LookupKey {
    if is_email(value) {
        LookupKey::Email
    } else if value.parse::<i64>().is_err() {
        LookupKey::Username
    } else {
        LookupKey::Id
    }
}
