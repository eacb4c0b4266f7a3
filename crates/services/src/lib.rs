//! External-service clients and file storage for the Cityline platform.
//!
//! - [`geocode`]: forward geocoding of city names with a fail-soft fallback
//! - [`summary`]: the weekly-report text generator behind the [`summary::Summarizer`] trait
//! - [`storage`]: on-disk storage for citizen and technician photo uploads

pub mod geocode;
pub mod storage;
pub mod summary;
