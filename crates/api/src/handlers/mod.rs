//! HTTP request handlers, grouped by audience.

pub mod admin;
pub mod auth;
pub mod issues;
pub mod technician;
