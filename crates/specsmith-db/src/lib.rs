//! PostgreSQL access for specsmith: pool construction, embedded
//! migrations, row models, and per-table query modules.

pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
