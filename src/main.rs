//! Application entry point for quill-bot.
//!
//! Initializes all components and starts the Discord bot.

use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use dotenv::dotenv;
use log::debug;
use log::info;

use quill_bot::bot::Bot;
use quill_bot::config::Config;
use quill_bot::event::EscalationEvent;
use quill_bot::event::InteractionEvent;
use quill_bot::event::ReminderDueEvent;
use quill_bot::event::event_bus::EventBus;
use quill_bot::gateway::DeliveryGateway;
use quill_bot::gateway::discord_gateway::DiscordGateway;
use quill_bot::logging::setup_logging;
use quill_bot::repository::Repository;
use quill_bot::service::Services;
use quill_bot::subscriber::escalation_subscriber::EscalationSubscriber;
use quill_bot::subscriber::interaction_subscriber::InteractionSubscriber;
use quill_bot::subscriber::reminder_subscriber::ReminderSubscriber;
use quill_bot::task::inactivity_sweeper::InactivitySweeper;
use quill_bot::task::reminder_publisher::ReminderPublisher;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    let init_start = Instant::now();
    let config = load_config().await?;
    let event_bus = Arc::new(EventBus::new());

    let db = setup_database(&config, init_start).await?;
    let services = Arc::new(Services::new(db.clone(), config.schedule.clone()));

    let bot = setup_bot(&config, services.clone(), event_bus.clone(), init_start).await?;

    setup_subscribers(&config, services.clone(), event_bus.clone(), &bot)?;
    setup_tasks(&config, services, event_bus, init_start)?;

    run(init_start).await
}

async fn load_config() -> Result<Arc<Config>> {
    debug!("Loading configuration...");
    let mut config = Config::new();
    config.load()?;
    let config = Arc::new(config);
    setup_logging(&config)?;
    info!("Starting quill-bot...");
    Ok(config)
}

async fn setup_database(config: &Config, init_start: Instant) -> Result<Arc<Repository>> {
    debug!("Setting up Repository...");
    let db = Arc::new(Repository::new(&config.db_url, &config.db_path).await?);

    info!("Running database migrations...");
    db.run_migrations().await?;
    info!(
        "Database setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );

    Ok(db)
}

async fn setup_bot(
    config: &Arc<Config>,
    services: Arc<Services>,
    event_bus: Arc<EventBus>,
    init_start: Instant,
) -> Result<Arc<Bot>> {
    info!("Starting bot...");
    let mut bot = Bot::new(config.clone(), services, event_bus).await?;

    bot.start();
    let bot = Arc::new(bot);
    info!(
        "Bot setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );

    Ok(bot)
}

fn setup_subscribers(
    config: &Config,
    services: Arc<Services>,
    event_bus: Arc<EventBus>,
    bot: &Bot,
) -> Result<()> {
    debug!("Setting up Subscribers...");

    let gateway: Arc<dyn DeliveryGateway> = Arc::new(DiscordGateway::new(bot.http.clone()));
    let reminder = Arc::new(ReminderSubscriber::new(gateway.clone(), services.clone()));
    let escalation = Arc::new(EscalationSubscriber::new(
        gateway,
        services.clone(),
        config.admin_id,
    ));
    let interaction = Arc::new(InteractionSubscriber::new(services));

    event_bus
        .register_subscriber::<ReminderDueEvent, _>(reminder)
        .register_subscriber::<EscalationEvent, _>(escalation)
        .register_subscriber::<InteractionEvent, _>(interaction);

    Ok(())
}

fn setup_tasks(
    config: &Config,
    services: Arc<Services>,
    event_bus: Arc<EventBus>,
    init_start: Instant,
) -> Result<()> {
    debug!("Setting up Tasks...");

    ReminderPublisher::new(
        services.clone(),
        event_bus.clone(),
        config.schedule.clone(),
    )
    .start()?;

    InactivitySweeper::new(services, event_bus, config.schedule.clone()).start()?;

    info!(
        "Tasks setup complete ({:.2}s).",
        init_start.elapsed().as_secs_f64()
    );
    Ok(())
}

async fn run(init_start: Instant) -> Result<()> {
    info!(
        "quill-bot is up in {:.2}s. Press Ctrl+C to stop.",
        init_start.elapsed().as_secs_f64()
    );

    tokio::signal::ctrl_c().await?;
    info!("Ctrl+C received, shutting down.");

    Ok(())
}
