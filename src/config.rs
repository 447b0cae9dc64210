use dotenvy::dotenv;
use std::env;

#[derive(Clone)]
pub struct Config {
    pub discord_token: String,
    pub command_prefix: String,
    pub data_file: String,
    pub roster_refs_file: String,
    pub roster_channel_name: String,
    pub reset_interval_secs: u64,
    pub status_message: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv().ok();
        Self::build()
    }

    fn build() -> anyhow::Result<Self> {
        Ok(Config {
            discord_token: env::var("DISCORD_TOKEN")
                .map_err(|_| anyhow::anyhow!("DISCORD_TOKEN must be set"))?,
            command_prefix: env::var("COMMAND_PREFIX").unwrap_or_else(|_| "!".to_string()),
            data_file: env::var("DATA_FILE").unwrap_or_else(|_| "data/players.json".to_string()),
            roster_refs_file: env::var("ROSTER_REFS_FILE")
                .unwrap_or_else(|_| "data/roster_messages.json".to_string()),
            roster_channel_name: env::var("ROSTER_CHANNEL_NAME")
                .unwrap_or_else(|_| "raid-protected-elites".to_string()),
            reset_interval_secs: env::var("RESET_INTERVAL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .unwrap_or(86400),
            status_message: env::var("STATUS_MESSAGE")
                .unwrap_or_else(|_| "Guarding the protection list".to_string()),
        })
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("discord_token", &"[REDACTED]")
            .field("command_prefix", &self.command_prefix)
            .field("data_file", &self.data_file)
            .field("roster_refs_file", &self.roster_refs_file)
            .field("roster_channel_name", &self.roster_channel_name)
            .field("reset_interval_secs", &self.reset_interval_secs)
            .field("status_message", &self.status_message)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_config_logic() {
        // 1. Test missing token
        env::remove_var("DISCORD_TOKEN");
        let result = Config::build();
        assert!(result.is_err(), "Should fail when DISCORD_TOKEN is missing");

        // 2. Test defaults
        env::set_var("DISCORD_TOKEN", "test_token");
        let config = Config::build().unwrap();
        assert_eq!(config.discord_token, "test_token");
        assert_eq!(config.command_prefix, "!");
        assert_eq!(config.roster_channel_name, "raid-protected-elites");
        assert_eq!(config.reset_interval_secs, 86400);

        // 3. Test debug redaction
        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("test_token"));
        assert!(debug_output.contains("[REDACTED]"));

        // Cleanup
        env::remove_var("DISCORD_TOKEN");
    }
}
