//! Integration tests for the notification dispatch layer.

use std::sync::Arc;

use quill_bot::config::ScheduleConfig;
use quill_bot::event::EscalationEvent;
use quill_bot::event::ReminderDueEvent;
use quill_bot::gateway::DeliveryGateway;
use quill_bot::model::ReminderSlot;
use quill_bot::repository::table::Table;
use quill_bot::service::Services;
use quill_bot::subscriber::Subscriber;
use quill_bot::subscriber::escalation_subscriber::EscalationSubscriber;
use quill_bot::subscriber::reminder_subscriber::ReminderSubscriber;

mod common;

const ADMIN_ID: u64 = 9000;

async fn setup() -> (
    Arc<quill_bot::repository::Repository>,
    Arc<Services>,
    common::RecordingGateway,
    std::path::PathBuf,
) {
    let (db, db_path) = common::setup_db().await;
    let services = Arc::new(Services::new(db.clone(), ScheduleConfig::default()));
    let gateway = common::RecordingGateway::new();
    (db, services, gateway, db_path)
}

async fn enroll(services: &Services, user_id: u64) -> quill_bot::model::SubscriberModel {
    match services
        .subscription
        .enroll(user_id, common::at_noon(common::date(2025, 6, 10)))
        .await
        .unwrap()
    {
        quill_bot::service::subscription_service::EnrollResult::Enrolled { subscriber } => {
            subscriber
        }
        _ => panic!("Expected fresh enrollment"),
    }
}

#[tokio::test]
async fn test_reminder_advances_bookkeeping_on_confirmed_delivery() {
    let (db, services, gateway, db_path) = setup().await;
    let subscriber = enroll(&services, 1).await;

    let dispatcher = ReminderSubscriber::new(
        Arc::new(gateway.clone()) as Arc<dyn DeliveryGateway>,
        services.clone(),
    );
    dispatcher
        .callback(ReminderDueEvent {
            subscriber,
            slot: ReminderSlot::Morning,
        })
        .await
        .unwrap();

    assert_eq!(gateway.sent_to(1).len(), 1);
    let stored = db.subscriber.select(&1).await.unwrap().unwrap();
    assert!(stored.last_reminded_at.is_some());

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_reminder_failure_leaves_bookkeeping_unchanged() {
    let (db, services, gateway, db_path) = setup().await;
    let subscriber = enroll(&services, 1).await;
    gateway.fail_for(1);

    let dispatcher = ReminderSubscriber::new(
        Arc::new(gateway.clone()) as Arc<dyn DeliveryGateway>,
        services.clone(),
    );
    // A failed delivery is not an error: the next slot retries naturally
    dispatcher
        .callback(ReminderDueEvent {
            subscriber,
            slot: ReminderSlot::Morning,
        })
        .await
        .unwrap();

    assert!(gateway.sent().is_empty());
    let stored = db.subscriber.select(&1).await.unwrap().unwrap();
    assert!(stored.last_reminded_at.is_none());

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_reminder_failure_does_not_affect_other_subscribers() {
    let (db, services, gateway, db_path) = setup().await;
    let blocked = enroll(&services, 1).await;
    let reachable = enroll(&services, 2).await;
    gateway.fail_for(1);

    let dispatcher = ReminderSubscriber::new(
        Arc::new(gateway.clone()) as Arc<dyn DeliveryGateway>,
        services.clone(),
    );
    for subscriber in [blocked, reachable] {
        dispatcher
            .callback(ReminderDueEvent {
                subscriber,
                slot: ReminderSlot::Morning,
            })
            .await
            .unwrap();
    }

    assert!(gateway.sent_to(1).is_empty());
    assert_eq!(gateway.sent_to(2).len(), 1);
    let stored = db.subscriber.select(&2).await.unwrap().unwrap();
    assert!(stored.last_reminded_at.is_some());

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_same_day_interaction_does_not_suppress_later_reminder() {
    let (_db, services, gateway, db_path) = setup().await;
    let subscriber = enroll(&services, 1).await;

    // The subscriber replies to the morning reminder...
    services
        .engagement
        .record_interaction(1, common::at_noon(common::date(2025, 6, 10)))
        .await
        .unwrap();

    // ...and the evening reminder still goes out
    let dispatcher = ReminderSubscriber::new(
        Arc::new(gateway.clone()) as Arc<dyn DeliveryGateway>,
        services.clone(),
    );
    dispatcher
        .callback(ReminderDueEvent {
            subscriber,
            slot: ReminderSlot::Evening,
        })
        .await
        .unwrap();

    assert_eq!(gateway.sent_to(1).len(), 1);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_escalation_sends_check_in_and_alerts_admin_once() {
    let (db, services, gateway, db_path) = setup().await;
    let subscriber = enroll(&services, 7).await;

    let dispatcher = EscalationSubscriber::new(
        Arc::new(gateway.clone()) as Arc<dyn DeliveryGateway>,
        services.clone(),
        Some(ADMIN_ID),
    );
    let event = EscalationEvent {
        subscriber,
        silent_days: 3,
    };
    dispatcher.callback(event.clone()).await.unwrap();

    assert_eq!(gateway.sent_to(7).len(), 1);
    assert_eq!(gateway.sent_to(ADMIN_ID).len(), 1);
    let stored = db.subscriber.select(&7).await.unwrap().unwrap();
    assert!(stored.escalated);

    // A replayed trigger for the same streak never re-alerts the admin
    dispatcher.callback(event).await.unwrap();
    assert_eq!(gateway.sent_to(ADMIN_ID).len(), 1);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_escalation_without_admin_still_sends_check_in() {
    let (db, services, gateway, db_path) = setup().await;
    let subscriber = enroll(&services, 7).await;

    let dispatcher = EscalationSubscriber::new(
        Arc::new(gateway.clone()) as Arc<dyn DeliveryGateway>,
        services.clone(),
        None,
    );
    dispatcher
        .callback(EscalationEvent {
            subscriber,
            silent_days: 3,
        })
        .await
        .unwrap();

    // The check-in is the only message: no alert went anywhere
    assert_eq!(gateway.sent_to(7).len(), 1);
    assert_eq!(gateway.sent().len(), 1);
    let stored = db.subscriber.select(&7).await.unwrap().unwrap();
    assert!(stored.escalated);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_failed_check_in_retries_on_next_sweep() {
    let (db, services, gateway, db_path) = setup().await;
    let subscriber = enroll(&services, 7).await;
    gateway.fail_for(7);

    let dispatcher = EscalationSubscriber::new(
        Arc::new(gateway.clone()) as Arc<dyn DeliveryGateway>,
        services.clone(),
        Some(ADMIN_ID),
    );
    dispatcher
        .callback(EscalationEvent {
            subscriber: subscriber.clone(),
            silent_days: 3,
        })
        .await
        .unwrap();

    // Nothing delivered, nothing claimed: the next sweep re-escalates
    assert!(gateway.sent().is_empty());
    let stored = db.subscriber.select(&7).await.unwrap().unwrap();
    assert!(!stored.escalated);

    // Delivery recovers on a later attempt
    gateway.clear_failures();
    dispatcher
        .callback(EscalationEvent {
            subscriber,
            silent_days: 4,
        })
        .await
        .unwrap();
    assert_eq!(gateway.sent_to(7).len(), 1);
    assert_eq!(gateway.sent_to(ADMIN_ID).len(), 1);
    let stored = db.subscriber.select(&7).await.unwrap().unwrap();
    assert!(stored.escalated);

    common::teardown_db(db_path).await;
}
