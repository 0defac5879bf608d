//! Business services on top of the repository.

use std::sync::Arc;

use crate::config::ScheduleConfig;
use crate::repository::Repository;
use crate::service::engagement_service::EngagementService;
use crate::service::maintenance_service::MaintenanceService;
use crate::service::subscription_service::SubscriptionService;

pub mod engagement_service;
pub mod error;
pub mod maintenance_service;
pub mod subscription_service;

pub struct Services {
    pub subscription: Arc<SubscriptionService>,
    pub engagement: Arc<EngagementService>,
    pub maintenance: Arc<MaintenanceService>,
}

impl Services {
    pub fn new(db: Arc<Repository>, schedule: ScheduleConfig) -> Self {
        Self {
            subscription: Arc::new(SubscriptionService::new(db.clone(), schedule.utc_offset)),
            engagement: Arc::new(EngagementService::new(db.clone(), schedule)),
            maintenance: Arc::new(MaintenanceService::new(db)),
        }
    }
}
