// Infrastructure layer module
// Contains the SQLite adapters for the domain repository ports
// Follows Hexagonal Architecture

pub mod database;
pub mod repositories;

pub use database::Database;
