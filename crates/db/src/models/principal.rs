//! The three principal entities: citizens, admins, and technicians.
//!
//! Each role has its own table and credential space. Entity structs carry
//! the password hash and deliberately do not derive `Serialize`; handlers
//! build safe response shapes instead.

use serde::Serialize;
use sqlx::FromRow;

use cityline_core::types::{DbId, Timestamp};

/// A row from the `users` table (citizen account).
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub city: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering a citizen. The password arrives already hashed.
#[derive(Debug)]
pub struct CreateUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub city: String,
}

/// A row from the `admins` table.
#[derive(Debug, Clone, FromRow)]
pub struct Admin {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub city: String,
    pub department: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating an admin.
#[derive(Debug)]
pub struct CreateAdmin {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub city: String,
    pub department: String,
}

/// A row from the `technicians` table.
#[derive(Debug, Clone, FromRow)]
pub struct Technician {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub city: String,
    pub department: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a technician.
#[derive(Debug)]
pub struct CreateTechnician {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub city: String,
    pub department: String,
}

/// Roster row: a technician with their current assigned-issue load.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TechnicianWithLoad {
    pub id: DbId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub city: String,
    pub department: String,
    pub assigned_issues: i64,
    pub created_at: Timestamp,
}

/// Assignment candidate for an issue (same city and department).
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EligibleTechnician {
    pub id: DbId,
    pub name: String,
}
