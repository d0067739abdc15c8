//! EduWealth Core Library
//!
//! Shared functionality for the EduWealth student finance tool:
//! - Database access and migrations
//! - Spending classifier (essential vs. wasteful expenses)
//! - Course recommender (price-anchored and interest-anchored)
//! - Built-in sample course fallback
//! - Course catalog ingest with hash-keyed upsert
//! - Password hashing

pub mod auth;
pub mod classify;
pub mod db;
pub mod error;
pub mod ingest;
pub mod models;
pub mod recommend;
pub mod samples;

pub use classify::{classify, Verdict};
pub use db::Database;
pub use error::{Error, Result};
pub use ingest::{run_ingest, source_hash, IngestReport};
pub use recommend::{
    browse, recommend_for_amount, BrowseQuery, BrowseResult, CourseCatalog, MAX_RECOMMENDATIONS,
};
