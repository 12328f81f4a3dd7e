mod commands;
mod composer;
mod config;
mod feed;
mod logging;
mod models;
mod service;
mod store;
mod utils;

use log::LevelFilter;
use log4rs::{
    append::{
        console::ConsoleAppender,
        rolling_file::{
            RollingFileAppender,
            policy::compound::{
                CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
            },
        },
    },
    config::{Appender, Config as Log4rsConfig, Root},
    encode::pattern::PatternEncoder,
};
use std::sync::Arc;

use poise::serenity_prelude::{self as serenity, GatewayIntents, UserId};

use commands::{confess, confessembed, feed as feed_command};
use config::Config;
use feed::ActiveViews;
use service::{ConfessionService, ReactionSink, RecordSource};
use store::ConfessionStore;
use utils::CONFESS_BUTTON_ID;

// --- Poise Types ---

/// User data, which is stored and accessible in all command invocations
pub struct Data {
    pub config: Config,
    pub service: Arc<dyn ConfessionService>,
    pub source: Arc<dyn RecordSource>,
    pub reactions: Arc<dyn ReactionSink>,
    pub views: ActiveViews<UserId>,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

// --- Error Handler ---

async fn on_error(error: poise::FrameworkError<'_, Data, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => panic!("Failed to start bot: {:?}", error),
        poise::FrameworkError::Command { error, ctx, .. } => {
            log::error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {}", error)).await {
                log::error!("Failed to send error message: {:?}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                log::error!("Error while handling error: {:?}", e);
            }
        }
    }
}

// --- Logging ---

fn init_logging(level: LevelFilter) -> Result<(), Error> {
    let window_roller = FixedWindowRoller::builder()
        .base(1)
        .build("logs/whisper_audit.{}.log", 10)?;

    let size_trigger = SizeTrigger::new(10 * 1024 * 1024); // 10MB

    let compound_policy = CompoundPolicy::new(Box::new(size_trigger), Box::new(window_roller));

    let file_appender = RollingFileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "[{d(%Y-%m-%dT%H:%M:%S%z)}] | {l} | {M} | {m}\n",
        )))
        .build("logs/whisper_audit.log", Box::new(compound_policy))?;

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "[{d(%Y-%m-%dT%H:%M:%S%z)}] | {l} | {M} | {m}\n",
        )))
        .build();

    let log_config = Log4rsConfig::builder()
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .appender(Appender::builder().build("stdout", Box::new(stdout_appender)))
        .build(
            Root::builder()
                .appender("file")
                .appender("stdout")
                .build(level),
        )?;

    log4rs::init_config(log_config)?;
    Ok(())
}

// --- Main ---

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load().await {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return;
        }
    };

    if let Err(e) = init_logging(config.level_filter()) {
        eprintln!("Failed to initialize logging: {}", e);
        return;
    }

    let store = match ConfessionStore::load(&config.store_path).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            log::error!("Failed to load confessions: {}", e);
            return;
        }
    };
    log::info!(
        "Loaded {} confessions from {}",
        store.count().await,
        config.store_path
    );

    let token = config.discord_token.clone();
    let data = Data {
        config,
        service: store.clone(),
        source: store.clone(),
        reactions: store,
        views: ActiveViews::default(),
    };

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                confess::confess(),
                confessembed::confessembed(),
                feed_command::feed(),
            ],
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    if let serenity::FullEvent::InteractionCreate { interaction } = event {
                        if let Some(component) = interaction.as_message_component() {
                            if component.data.custom_id == CONFESS_BUTTON_ID {
                                confess::open_from_button(ctx, data, component).await?;
                            }
                        }
                    }
                    Ok(())
                })
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            Box::pin(async move {
                log::info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    // Slash commands and component interactions need no privileged intents
    let intents = GatewayIntents::empty();

    let client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await;

    match client {
        Ok(mut client) => {
            if let Err(why) = client.start().await {
                log::error!("Client error: {:?}", why);
            }
        }
        Err(why) => log::error!("Failed to create client: {:?}", why),
    }
}
