pub mod commands;
pub mod error;
pub mod error_handler;

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use futures::lock::Mutex;
use log::info;
use poise::Framework;
use poise::FrameworkOptions;
use poise::serenity_prelude as serenity;
use serenity::Client;
use serenity::ClientBuilder;
use serenity::GatewayIntents;
use serenity::Http;
use serenity::UserId;

use crate::bot::commands::Cog;
use crate::bot::commands::Cogs;
use crate::bot::error_handler::ErrorHandler;
use crate::config::Config;
use crate::event::InteractionEvent;
use crate::event::InteractionKind;
use crate::event::event_bus::EventBus;
use crate::service::Services;

pub type Error = Box<dyn std::error::Error + Send + Sync>;

pub struct Data {
    pub config: Arc<Config>,
    pub services: Arc<Services>,
}

pub struct Bot {
    pub http: Arc<Http>,
    client_builder: Option<ClientBuilder>,
    client: Arc<Mutex<Option<Client>>>,
}

impl Bot {
    pub async fn new(
        config: Arc<Config>,
        services: Arc<Services>,
        event_bus: Arc<EventBus>,
    ) -> Result<Self> {
        info!("Initializing bot...");

        let framework = Self::create_framework(config.clone(), services);
        let event_handler = BotEventHandler::new(event_bus);
        let intents = GatewayIntents::non_privileged() | GatewayIntents::MESSAGE_CONTENT;

        let http = Arc::new(Http::new(&config.discord_token));
        let client_builder = ClientBuilder::new(&config.discord_token, intents)
            .event_handler(event_handler)
            .framework(framework);

        Ok(Self {
            http,
            client_builder: Some(client_builder),
            client: Arc::new(Mutex::new(None)),
        })
    }

    pub fn start(&mut self) {
        info!("Starting bot client...");
        let client_builder = self.client_builder.take().expect("start() called twice");
        let client = self.client.clone();

        tokio::spawn(async move {
            info!("Connecting bot to Discord...");
            let built_client = client_builder
                .await
                .expect("Failed to build Discord client");

            *client.lock().await = Some(built_client);
            info!("Bot connected to Discord.");

            client
                .lock()
                .await
                .as_mut()
                .expect("client was just stored")
                .start()
                .await
                .expect("Bot client crashed");
        });

        info!("Bot client start initiated.");
    }

    fn create_framework(config: Arc<Config>, services: Arc<Services>) -> Framework<Data, Error> {
        let mut owners = HashSet::new();
        if let Some(admin_id) = config.admin_id {
            owners.insert(UserId::new(admin_id));
        }

        let options = FrameworkOptions::<Data, Error> {
            commands: Cogs.commands(),
            on_error: |error| Box::pin(ErrorHandler::handle(error)),
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some("!".into()),
                ..Default::default()
            },
            owners,
            ..Default::default()
        };

        Framework::builder()
            .options(options)
            .setup(move |ctx, _ready, framework| {
                Box::pin(async move {
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                    info!("Registered global commands.");
                    Ok(Data { config, services })
                })
            })
            .build()
    }
}

/// Forwards inbound Discord activity onto the event bus.
pub struct BotEventHandler {
    event_bus: Arc<EventBus>,
}

impl BotEventHandler {
    pub fn new(event_bus: Arc<EventBus>) -> Self {
        Self { event_bus }
    }
}

#[async_trait]
impl serenity::EventHandler for BotEventHandler {
    async fn message(&self, _ctx: serenity::Context, message: serenity::Message) {
        if message.author.bot {
            return;
        }
        self.event_bus.publish(InteractionEvent {
            user_id: message.author.id.get(),
            at: Utc::now(),
            kind: InteractionKind::Message,
        });
    }

    async fn reaction_add(&self, _ctx: serenity::Context, reaction: serenity::Reaction) {
        let Some(user_id) = reaction.user_id else {
            return;
        };
        self.event_bus.publish(InteractionEvent {
            user_id: user_id.get(),
            at: Utc::now(),
            kind: InteractionKind::Reaction,
        });
    }
}
