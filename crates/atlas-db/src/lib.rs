//! # atlas-db: Database Layer for Atlas POS
//!
//! All SQLite access for the POS lives here: the connection pool, the
//! embedded migrations, and one repository per aggregate.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          atlas-db                               │
//! │                                                                 │
//! │  ┌───────────┐   ┌──────────────┐   ┌──────────────────────┐   │
//! │  │  pool.rs  │──►│ migrations.rs│   │    repository/       │   │
//! │  │  Database │   │  (embedded)  │   │  user  product  sale │   │
//! │  └───────────┘   └──────────────┘   │  category  report    │   │
//! │        │                            │  activity  settings  │   │
//! │        └───────────────────────────►│  bootstrap           │   │
//! │                                     └──────────────────────┘   │
//! │                                                                 │
//! │  Domain types and rules come from atlas-core; this crate adds  │
//! │  persistence and the atomic sale transaction.                  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Guarantees
//! - A sale either fully commits (sale + items + stock decrements) or
//!   leaves no trace; oversell is rejected inside the same transaction
//! - Passwords are stored hashed; legacy hashes upgrade on login
//! - Operator deletes are soft (status flip), never row removals

pub mod bootstrap;
pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::sale::CreatedSale;
