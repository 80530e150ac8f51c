//! PostgreSQL persistence adapters built on Diesel.
//!
//! Adapters translate rows to domain types and enforce the atomic guards the
//! ports describe; business rules stay in the domain services. Row structs
//! and table definitions are private to this module.
//!
//! ```ignore
//! use registrar::outbound::persistence::{DbPool, DieselRegistrationLedger, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/registrar")).await?;
//! let ledger = DieselRegistrationLedger::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_course_catalog_repository;
mod diesel_registration_ledger;
mod diesel_user_directory;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_course_catalog_repository::DieselCourseCatalogRepository;
pub use diesel_registration_ledger::DieselRegistrationLedger;
pub use diesel_user_directory::DieselUserDirectory;
pub use migrations::{MigrationError, apply_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
