//! # Repository Layer
//!
//! One repository per aggregate, each owning a clone of the shared pool.
//! Repositories are cheap to construct (pool clones are Arc bumps) and
//! are handed out by [`crate::Database`] accessors.
//!
//! ## Conventions
//! - Read queries filter soft-deleted rows (`status = 'active'`) unless
//!   the method says otherwise
//! - Timestamps are written by the application in UTC
//! - Monetary values are integer cents end to end

pub mod activity;
pub mod category;
pub mod product;
pub mod report;
pub mod sale;
pub mod settings;
pub mod user;
