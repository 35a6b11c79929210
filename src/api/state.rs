use std::sync::Arc;

use crate::api::links::Links;
use crate::config::Config;
use crate::infrastructure::Database;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,
    pub links: Links,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(db: Database, config: Config) -> Self {
        Self {
            db,
            links: Links::new(config.public_url.clone()),
            config: Arc::new(config),
        }
    }
}
