pub mod commands;
pub mod config;
pub mod publisher;
pub mod reset;
pub mod roster;
pub mod store;

/// Custom data passed to all commands
pub struct Data {
    pub config: config::Config,
    pub store: store::PlayerStore,
    pub roster: publisher::RosterPublisher,
}

pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;
