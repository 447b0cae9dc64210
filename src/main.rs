use poise::serenity_prelude as serenity;
use raidward::commands::{account, help, protection};
use raidward::config::Config;
use raidward::publisher::RosterPublisher;
use raidward::reset::DailyResetTask;
use raidward::store::PlayerStore;
use raidward::Data;
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    let discord_token = config.discord_token.clone();

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                account::register(),
                account::unregister(),
                protection::protect(),
                protection::unprotect(),
                protection::status(),
                help::help(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(config.command_prefix.clone()),
                ..Default::default()
            },
            event_handler: |ctx, event, _framework, data| {
                Box::pin(async move {
                    match event {
                        serenity::FullEvent::CacheReady { guilds } => {
                            info!(
                                "Cache ready; publishing rosters to {} guild(s)",
                                guilds.len()
                            );
                            data.roster.refresh_all(ctx).await;
                        }
                        serenity::FullEvent::GuildCreate { guild, is_new } => {
                            if matches!(is_new, Some(true)) {
                                if let Err(e) = data.roster.refresh_guild(ctx, guild.id).await {
                                    error!(
                                        "Failed to publish roster in new guild {}: {}",
                                        guild.id, e
                                    );
                                }
                            }
                        }
                        _ => {}
                    }
                    Ok(())
                })
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, _framework| {
            Box::pin(async move {
                info!("Bot is ready!");

                // Set bot status
                ctx.set_activity(Some(serenity::ActivityData::custom(&config.status_message)));

                let store = PlayerStore::open(&config.data_file, &config.roster_refs_file)?;
                let roster =
                    RosterPublisher::new(store.clone(), config.roster_channel_name.clone());

                tokio::spawn(
                    DailyResetTask::new(store.clone(), config.reset_interval_secs).run(),
                );

                Ok(Data {
                    config,
                    store,
                    roster,
                })
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged()
        | serenity::GatewayIntents::MESSAGE_CONTENT
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let mut client = serenity::ClientBuilder::new(&discord_token, intents)
        .framework(framework)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create client: {}", e))?;

    info!("Starting bot...");
    if let Err(why) = client.start().await {
        error!("Client error: {:?}", why);
    }

    Ok(())
}
