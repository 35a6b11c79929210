// API layer module (adapters for controllers)
// Follows Hexagonal Architecture - API is an adapter

pub mod errors;
pub mod extract;
pub mod handlers;
pub mod links;
pub mod middleware;
pub mod pagination;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::AppState;
