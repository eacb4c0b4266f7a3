//! Repositories for the three principal tables.
//!
//! Citizens, admins, and technicians share the same CRUD contract over
//! three separate tables. Keeping them separate (rather than one table
//! with a role column) means an id can never cross credential spaces.

use sqlx::PgPool;

use cityline_core::types::DbId;

use crate::models::principal::{
    Admin, CreateAdmin, CreateTechnician, CreateUser, EligibleTechnician, Technician,
    TechnicianWithLoad, User,
};

/// Column list for users queries.
const USER_COLUMNS: &str = "id, name, email, password_hash, phone, city, created_at, updated_at";

/// Column list for admins queries.
const ADMIN_COLUMNS: &str =
    "id, name, email, password_hash, city, department, created_at, updated_at";

/// Column list for technicians queries.
const TECHNICIAN_COLUMNS: &str =
    "id, name, email, password_hash, phone, city, department, created_at, updated_at";

/// Provides CRUD operations for citizen accounts.
pub struct UserRepo;

impl UserRepo {
    /// Create a citizen account, returning the created row. A duplicate
    /// email violates `uq_users_email`.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (name, email, password_hash, phone, city)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.phone)
            .bind(&input.city)
            .fetch_one(pool)
            .await
    }

    /// Find a citizen by email (login lookup).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a citizen by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Provides CRUD operations for admin accounts.
pub struct AdminRepo;

impl AdminRepo {
    /// Create an admin account, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateAdmin) -> Result<Admin, sqlx::Error> {
        let query = format!(
            "INSERT INTO admins (name, email, password_hash, city, department)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {ADMIN_COLUMNS}"
        );
        sqlx::query_as::<_, Admin>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.city)
            .bind(&input.department)
            .fetch_one(pool)
            .await
    }

    /// Find an admin by email (login lookup).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Admin>, sqlx::Error> {
        let query = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE email = $1");
        sqlx::query_as::<_, Admin>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find an admin by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Admin>, sqlx::Error> {
        let query = format!("SELECT {ADMIN_COLUMNS} FROM admins WHERE id = $1");
        sqlx::query_as::<_, Admin>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}

/// Provides CRUD and roster operations for technician accounts.
pub struct TechnicianRepo;

impl TechnicianRepo {
    /// Create a technician account, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTechnician,
    ) -> Result<Technician, sqlx::Error> {
        let query = format!(
            "INSERT INTO technicians (name, email, password_hash, phone, city, department)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {TECHNICIAN_COLUMNS}"
        );
        sqlx::query_as::<_, Technician>(&query)
            .bind(&input.name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.phone)
            .bind(&input.city)
            .bind(&input.department)
            .fetch_one(pool)
            .await
    }

    /// Find a technician by email (login lookup).
    pub async fn find_by_email(
        pool: &PgPool,
        email: &str,
    ) -> Result<Option<Technician>, sqlx::Error> {
        let query = format!("SELECT {TECHNICIAN_COLUMNS} FROM technicians WHERE email = $1");
        sqlx::query_as::<_, Technician>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a technician by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Technician>, sqlx::Error> {
        let query = format!("SELECT {TECHNICIAN_COLUMNS} FROM technicians WHERE id = $1");
        sqlx::query_as::<_, Technician>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Roster for one scope with per-technician assigned-issue load,
    /// newest hires first.
    pub async fn list_with_load(
        pool: &PgPool,
        city: &str,
        department: &str,
    ) -> Result<Vec<TechnicianWithLoad>, sqlx::Error> {
        sqlx::query_as::<_, TechnicianWithLoad>(
            "SELECT t.id, t.name, t.email, t.phone, t.city, t.department,
                    (SELECT COUNT(*) FROM issues i WHERE i.technician_id = t.id) AS assigned_issues,
                    t.created_at
             FROM technicians t
             WHERE t.city = $1 AND t.department = $2
             ORDER BY t.created_at DESC",
        )
        .bind(city)
        .bind(department)
        .fetch_all(pool)
        .await
    }

    /// Assignment candidates for an issue's scope, alphabetical.
    pub async fn list_eligible(
        pool: &PgPool,
        city: &str,
        department: &str,
    ) -> Result<Vec<EligibleTechnician>, sqlx::Error> {
        sqlx::query_as::<_, EligibleTechnician>(
            "SELECT id, name FROM technicians
             WHERE city = $1 AND department = $2
             ORDER BY name ASC",
        )
        .bind(city)
        .bind(department)
        .fetch_all(pool)
        .await
    }

    /// Delete a technician. Their issues keep the audit history but lose
    /// the assignment (the FK is ON DELETE SET NULL). Returns `true` if a
    /// row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM technicians WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
