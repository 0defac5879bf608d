//! Administrative and maintenance service.

use std::sync::Arc;

use serde::Serialize;

use crate::model::BotMetaModel;
use crate::model::SubscriberModel;
use crate::repository::Repository;
use crate::repository::table::Table;

/// Service for administrative and maintenance tasks.
pub struct MaintenanceService {
    db: Arc<Repository>,
}

impl MaintenanceService {
    /// Creates a new maintenance service.
    pub fn new(db: Arc<Repository>) -> Self {
        Self { db }
    }

    /// Dumps all database tables for inspection.
    pub async fn dump_database(&self) -> anyhow::Result<DatabaseDump> {
        let subscribers = self.db.subscriber.select_all().await?;
        let meta = self.db.bot_meta.select_all().await?;

        Ok(DatabaseDump { subscribers, meta })
    }
}

/// Container for a full database dump.
#[derive(Serialize)]
pub struct DatabaseDump {
    pub subscribers: Vec<SubscriberModel>,
    pub meta: Vec<BotMetaModel>,
}
