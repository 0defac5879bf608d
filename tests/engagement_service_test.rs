//! Integration tests for silence tracking and the daily sweep.

use quill_bot::config::ScheduleConfig;
use quill_bot::model::SubscriberModel;
use quill_bot::repository::table::Table;
use quill_bot::service::Services;
use quill_bot::service::engagement_service::InteractionOutcome;

mod common;

async fn setup() -> (
    std::sync::Arc<quill_bot::repository::Repository>,
    Services,
    std::path::PathBuf,
) {
    let (db, db_path) = common::setup_db().await;
    let services = Services::new(db.clone(), ScheduleConfig::default());
    (db, services, db_path)
}

#[tokio::test]
async fn test_record_interaction_is_idempotent() {
    let (db, services, db_path) = setup().await;

    services
        .subscription
        .enroll(1, common::at_noon(common::date(2025, 6, 5)))
        .await
        .unwrap();

    let outcome = services
        .engagement
        .record_interaction(1, common::at_noon(common::date(2025, 6, 6)))
        .await
        .unwrap();
    assert!(matches!(
        outcome,
        InteractionOutcome::Recorded { date } if date == common::date(2025, 6, 6)
    ));

    // Same instant again changes nothing
    let outcome = services
        .engagement
        .record_interaction(1, common::at_noon(common::date(2025, 6, 6)))
        .await
        .unwrap();
    assert!(matches!(outcome, InteractionOutcome::AlreadyCurrent));

    // An earlier instant never decreases the stored date
    let outcome = services
        .engagement
        .record_interaction(1, common::at_noon(common::date(2025, 6, 5)))
        .await
        .unwrap();
    assert!(matches!(outcome, InteractionOutcome::AlreadyCurrent));

    let stored = db.subscriber.select(&1).await.unwrap().unwrap();
    assert_eq!(stored.last_interaction_date, Some(common::date(2025, 6, 6)));
    assert_eq!(stored.silent_days, 0);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_record_interaction_ignores_unknown_and_unsubscribed() {
    let (_db, services, db_path) = setup().await;

    let outcome = services
        .engagement
        .record_interaction(404, common::at_noon(common::date(2025, 6, 6)))
        .await
        .unwrap();
    assert!(matches!(outcome, InteractionOutcome::Ignored));

    services
        .subscription
        .enroll(2, common::at_noon(common::date(2025, 6, 5)))
        .await
        .unwrap();
    services.subscription.unenroll(2).await.unwrap();

    let outcome = services
        .engagement
        .record_interaction(2, common::at_noon(common::date(2025, 6, 6)))
        .await
        .unwrap();
    assert!(matches!(outcome, InteractionOutcome::Ignored));

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_sweep_counts_silent_days_and_escalates_once() {
    let (db, services, db_path) = setup().await;

    // Last interaction on day 0
    services
        .subscription
        .enroll(1, common::at_noon(common::date(2025, 6, 10)))
        .await
        .unwrap();

    // Day 1 and day 2: counted, no escalation yet
    let outcome = services
        .engagement
        .run_sweep(common::date(2025, 6, 11))
        .await
        .unwrap();
    assert_eq!(outcome.swept, 1);
    assert!(outcome.escalations.is_empty());
    let stored = db.subscriber.select(&1).await.unwrap().unwrap();
    assert_eq!(stored.silent_days, 1);

    let outcome = services
        .engagement
        .run_sweep(common::date(2025, 6, 12))
        .await
        .unwrap();
    assert!(outcome.escalations.is_empty());
    let stored = db.subscriber.select(&1).await.unwrap().unwrap();
    assert_eq!(stored.silent_days, 2);

    // Day 3: threshold reached
    let outcome = services
        .engagement
        .run_sweep(common::date(2025, 6, 13))
        .await
        .unwrap();
    assert_eq!(outcome.escalations.len(), 1);
    assert_eq!(outcome.escalations[0].user_id, 1);
    assert_eq!(outcome.escalations[0].silent_days, 3);

    // The dispatcher confirms delivery and claims the flag
    assert!(services.engagement.claim_escalation(1).await.unwrap());
    assert!(!services.engagement.claim_escalation(1).await.unwrap());

    // Still silent on later days: no re-notification
    let outcome = services
        .engagement
        .run_sweep(common::date(2025, 6, 14))
        .await
        .unwrap();
    assert!(outcome.escalations.is_empty());
    let stored = db.subscriber.select(&1).await.unwrap().unwrap();
    assert_eq!(stored.silent_days, 4);
    assert!(stored.escalated);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_interaction_on_day_two_cancels_day_three_escalation() {
    let (db, services, db_path) = setup().await;

    services
        .subscription
        .enroll(1, common::at_noon(common::date(2025, 6, 10)))
        .await
        .unwrap();

    services
        .engagement
        .run_sweep(common::date(2025, 6, 11))
        .await
        .unwrap();

    // Interaction on day 2 resets the counter
    services
        .engagement
        .record_interaction(1, common::at_noon(common::date(2025, 6, 12)))
        .await
        .unwrap();
    let stored = db.subscriber.select(&1).await.unwrap().unwrap();
    assert_eq!(stored.silent_days, 0);

    // Day 3 sweep: one silent day, no escalation
    let outcome = services
        .engagement
        .run_sweep(common::date(2025, 6, 13))
        .await
        .unwrap();
    assert!(outcome.escalations.is_empty());
    let stored = db.subscriber.select(&1).await.unwrap().unwrap();
    assert_eq!(stored.silent_days, 1);
    assert!(!stored.escalated);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_sweep_measures_from_enrollment_when_no_interaction() {
    let (db, services, db_path) = setup().await;

    // A legacy row with no interaction recorded: silent since subscription
    let subscriber = SubscriberModel {
        user_id: 5,
        subscribed: true,
        subscribed_at: common::at_noon(common::date(2025, 6, 10)),
        last_interaction_date: None,
        ..Default::default()
    };
    db.subscriber.replace(&subscriber).await.unwrap();

    let outcome = services
        .engagement
        .run_sweep(common::date(2025, 6, 13))
        .await
        .unwrap();
    assert_eq!(outcome.escalations.len(), 1);
    assert_eq!(outcome.escalations[0].silent_days, 3);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_sweep_skips_unsubscribed_users() {
    let (db, services, db_path) = setup().await;

    services
        .subscription
        .enroll(1, common::at_noon(common::date(2025, 6, 1)))
        .await
        .unwrap();
    services.subscription.unenroll(1).await.unwrap();

    let outcome = services
        .engagement
        .run_sweep(common::date(2025, 6, 13))
        .await
        .unwrap();
    assert_eq!(outcome.swept, 0);
    assert!(outcome.escalations.is_empty());

    let stored = db.subscriber.select(&1).await.unwrap().unwrap();
    assert_eq!(stored.silent_days, 0);
    assert!(!stored.escalated);

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_sweep_occurrence_claimed_once_per_day() {
    let (_db, services, db_path) = setup().await;

    assert!(
        services
            .engagement
            .try_claim_sweep(common::date(2025, 6, 11))
            .await
            .unwrap()
    );
    // A replayed trigger for the same day loses the claim
    assert!(
        !services
            .engagement
            .try_claim_sweep(common::date(2025, 6, 11))
            .await
            .unwrap()
    );
    // So does a stale trigger for an earlier day
    assert!(
        !services
            .engagement
            .try_claim_sweep(common::date(2025, 6, 10))
            .await
            .unwrap()
    );
    // The next day claims fresh
    assert!(
        services
            .engagement
            .try_claim_sweep(common::date(2025, 6, 12))
            .await
            .unwrap()
    );

    common::teardown_db(db_path).await;
}

#[tokio::test]
async fn test_quiet_list_orders_most_silent_first() {
    let (_db, services, db_path) = setup().await;

    services
        .subscription
        .enroll(1, common::at_noon(common::date(2025, 6, 8)))
        .await
        .unwrap();
    services
        .subscription
        .enroll(2, common::at_noon(common::date(2025, 6, 4)))
        .await
        .unwrap();
    services
        .subscription
        .enroll(3, common::at_noon(common::date(2025, 6, 10)))
        .await
        .unwrap();

    let quiet = services
        .engagement
        .quiet_list(common::date(2025, 6, 10))
        .await
        .unwrap();

    // User 3 checked in today and is not listed
    assert_eq!(quiet.len(), 2);
    assert_eq!(quiet[0].0.user_id, 2);
    assert_eq!(quiet[0].1, 6);
    assert_eq!(quiet[1].0.user_id, 1);
    assert_eq!(quiet[1].1, 2);

    common::teardown_db(db_path).await;
}
