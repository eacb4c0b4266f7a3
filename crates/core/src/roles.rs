//! Actor roles and audit attribution.
//!
//! The three principal types live in separate credential tables and are
//! never polymorphic over one another; the role tag travels in JWT claims
//! and session rows as its lowercase string.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The three principal types of the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Citizen,
    Admin,
    Technician,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Admin => "admin",
            Role::Technician => "technician",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "citizen" => Ok(Role::Citizen),
            "admin" => Ok(Role::Admin),
            "technician" => Ok(Role::Technician),
            _ => Err(CoreError::Validation(format!(
                "Invalid role '{s}'. Must be one of: citizen, admin, technician"
            ))),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Attribution label stored on audit-trail rows. Only staff write the
/// trail, so citizens have no variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpdateAuthor {
    Admin,
    Technician,
}

impl UpdateAuthor {
    pub fn as_str(self) -> &'static str {
        match self {
            UpdateAuthor::Admin => "Admin",
            UpdateAuthor::Technician => "Technician",
        }
    }
}

impl std::fmt::Display for UpdateAuthor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for UpdateAuthor {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Admin" => Ok(UpdateAuthor::Admin),
            "Technician" => Ok(UpdateAuthor::Technician),
            _ => Err(CoreError::Validation(format!(
                "Invalid audit author '{s}'. Must be one of: Admin, Technician"
            ))),
        }
    }
}

impl TryFrom<String> for UpdateAuthor {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
