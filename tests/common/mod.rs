use std::path::PathBuf;
use std::sync::Arc;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::NaiveDate;
use chrono::TimeZone;
use chrono::Utc;
use quill_bot::gateway::DeliveryGateway;
use quill_bot::gateway::GatewayError;
use quill_bot::repository::Repository;
use uuid::Uuid;

pub async fn setup_db() -> (Arc<Repository>, PathBuf) {
    let uuid = Uuid::new_v4();
    let db_path = std::env::temp_dir().join(format!("quill-bot-test-{}.db", uuid));
    let db_url = format!("sqlite://{}", db_path.to_str().unwrap());

    let db = Repository::new(&db_url, db_path.to_str().unwrap())
        .await
        .expect("Failed to create database");

    db.run_migrations().await.expect("Failed to run migrations");

    (Arc::new(db), db_path)
}

pub async fn teardown_db(db_path: PathBuf) {
    if db_path.exists() {
        let _ = std::fs::remove_file(db_path);
    }
}

#[allow(dead_code)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid test date")
}

#[allow(dead_code)]
pub fn at_noon(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_hms_opt(12, 0, 0).expect("valid test time"))
}

// MOCK GATEWAY

#[derive(Default)]
#[allow(dead_code)]
pub struct RecordingGatewayState {
    pub sent: Vec<(u64, String)>,
    pub fail_for: Vec<u64>,
}

/// Test double for the delivery transport: records every send and fails on
/// demand for selected recipients.
#[derive(Default, Clone)]
#[allow(dead_code)]
pub struct RecordingGateway {
    pub state: Arc<RwLock<RecordingGatewayState>>,
}

#[allow(dead_code)]
impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_for(&self, user_id: u64) {
        self.state.write().unwrap().fail_for.push(user_id);
    }

    pub fn clear_failures(&self) {
        self.state.write().unwrap().fail_for.clear();
    }

    pub fn sent(&self) -> Vec<(u64, String)> {
        self.state.read().unwrap().sent.clone()
    }

    pub fn sent_to(&self, user_id: u64) -> Vec<String> {
        self.state
            .read()
            .unwrap()
            .sent
            .iter()
            .filter(|(id, _)| *id == user_id)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

#[async_trait]
impl DeliveryGateway for RecordingGateway {
    async fn send_to_user(&self, user_id: u64, text: &str) -> Result<(), GatewayError> {
        let mut state = self.state.write().unwrap();
        if state.fail_for.contains(&user_id) {
            return Err(GatewayError::SendFailed {
                user_id,
                reason: "blocked by recipient".to_string(),
            });
        }
        state.sent.push((user_id, text.to_string()));
        Ok(())
    }
}
