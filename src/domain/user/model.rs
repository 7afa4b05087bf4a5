//! User account entity

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = String;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Rents vehicles
    Client,
    /// Owns and lists vehicles
    Lessor,
    /// Platform administrator
    Admin,
}

impl Default for UserRole {
    fn default() -> Self {
        Self::Client
    }
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Lessor => "lessor",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "client" => Ok(Self::Client),
            "lessor" | "owner" => Ok(Self::Lessor),
            "admin" => Ok(Self::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// User account as seen by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Lower-cased login name
    pub id: UserId,
    pub name: String,
    pub role: UserRole,
    /// Outcome of the external identity/document verification
    pub is_verified: bool,
    pub member_since: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_number: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: UserRole) -> Self {
        Self {
            id: normalize_user_id(&id.into()),
            name: name.into(),
            role,
            is_verified: false,
            member_since: Utc::now(),
            phone: None,
            license_number: None,
        }
    }

    pub fn verified(mut self) -> Self {
        self.is_verified = true;
        self
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Identity of this account when it acts on the engine.
    pub fn actor(&self) -> Actor {
        Actor {
            user_id: self.id.clone(),
            role: self.role,
        }
    }
}

/// Identifiers are case-insensitive.
pub fn normalize_user_id(id: &str) -> UserId {
    id.trim().to_lowercase()
}

/// The authenticated caller of an engine operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: UserRole) -> Self {
        Self {
            user_id: normalize_user_id(&user_id.into()),
            role,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self::new(user_id, UserRole::Admin)
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}
