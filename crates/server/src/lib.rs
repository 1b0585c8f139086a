pub mod config;
pub mod error;
pub mod extract;
pub mod http;
pub mod middleware;
pub mod routes;

use db::{DBService, DbErr};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct Deployment {
    db: DBService,
}

impl Deployment {
    pub async fn new(database_url: &str) -> Result<Self, DbErr> {
        let db = DBService::new(database_url).await?;
        Ok(Self { db })
    }

    pub fn from_db(db: DBService) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }
}
