//! Entity specs and handles exchanged with the identity store.
//!
//! Specs describe what to create; handles are what the store gives
//! back and what later calls reference. Handles are plain data (id +
//! name), safe to hold across transactions; whether they go stale is
//! a property of the backend's caching layer, surfaced through
//! `IdentityStore::refresh_realm`.

use serde::{Deserialize, Serialize};

/// OIDC protocol identifier used for every generated client.
pub const OIDC_PROTOCOL: &str = "openid-connect";

/// Settings for a new realm.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealmSpec {
    pub name: String,
    pub enabled: bool,
    pub registration_allowed: bool,
    pub access_code_lifespan_secs: u64,
    /// Backend password policy string, e.g. `hashIterations(20000)`.
    pub password_policy: String,
}

impl RealmSpec {
    /// The default security settings every generated realm gets.
    pub fn load_test_defaults(name: impl Into<String>, password_hash_iterations: u64) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            registration_allowed: true,
            access_code_lifespan_secs: 60,
            password_policy: format!("hashIterations({password_hash_iterations})"),
        }
    }
}

/// Reference to a created realm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RealmHandle {
    pub id: String,
    pub name: String,
}

/// Settings for a new client registration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSpec {
    pub client_id: String,
    pub name: String,
    pub enabled: bool,
    pub service_accounts_enabled: bool,
    pub direct_access_grants_enabled: bool,
    pub secret: String,
    pub redirect_uris: Vec<String>,
    pub public_client: bool,
    pub protocol: String,
}

impl ClientSpec {
    /// A confidential OIDC client with service accounts and direct
    /// grants enabled, a derived secret and a fully open redirect
    /// policy.
    pub fn load_test_defaults(client_id: impl Into<String>) -> Self {
        let client_id = client_id.into();
        Self {
            name: client_id.clone(),
            secret: format!("{client_id}-secret"),
            client_id,
            enabled: true,
            service_accounts_enabled: true,
            direct_access_grants_enabled: true,
            redirect_uris: vec!["*".to_string()],
            public_client: false,
            protocol: OIDC_PROTOCOL.to_string(),
        }
    }
}

/// Reference to a created client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHandle {
    pub id: String,
    pub client_id: String,
}

/// Reference to a created role (realm-scoped or client-scoped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRef {
    pub id: String,
    pub name: String,
}

/// Reference to a created group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupRef {
    pub id: String,
    pub name: String,
}

/// Settings for a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSpec {
    pub username: String,
    pub enabled: bool,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

impl UserSpec {
    /// Deterministic profile derived from the username and realm
    /// name, so verification can recompute it.
    pub fn load_test_defaults(username: impl Into<String>, realm_name: &str) -> Self {
        let username = username.into();
        Self {
            enabled: true,
            first_name: format!("{username}-first"),
            last_name: format!("{username}-last"),
            email: format!("{username}@{realm_name}.com"),
            username,
        }
    }
}

/// Reference to a created user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRef {
    pub id: String,
    pub username: String,
}

/// A password credential to attach to a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CredentialSpec {
    pub password: String,
    pub temporary: bool,
}

impl CredentialSpec {
    /// The deterministic per-user password (`<username>-password`).
    pub fn derived_password(username: &str) -> Self {
        Self {
            password: format!("{username}-password"),
            temporary: false,
        }
    }
}

/// A client together with its client roles, as returned by listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientWithRoles {
    pub client: ClientHandle,
    pub roles: Vec<RoleRef>,
}
