use crate::roster::{self, RosterEntry};
use crate::store::{PlayerStore, RosterRef};
use serenity::all::{
    ChannelId, ChannelType, Context, CreateChannel, CreateMessage, EditMessage, GuildId,
    MessageId, PermissionOverwrite, PermissionOverwriteType, Permissions, RoleId, UserId,
};
use tracing::{debug, error, info, warn};

/// Keeps the per-guild roster message in sync with the player store. One
/// message per guild; edited in place where possible, reposted and pinned
/// otherwise.
#[derive(Clone)]
pub struct RosterPublisher {
    store: PlayerStore,
    channel_name: String,
}

impl RosterPublisher {
    pub fn new(store: PlayerStore, channel_name: String) -> Self {
        Self {
            store,
            channel_name,
        }
    }

    pub async fn refresh_all(&self, ctx: &Context) {
        for guild_id in ctx.cache.guilds() {
            if let Err(e) = self.refresh_guild(ctx, guild_id).await {
                error!("Failed to refresh roster in guild {}: {}", guild_id, e);
            }
        }
    }

    /// Refreshes the roster on the first guild the user is a member of.
    pub async fn refresh_for_user(
        &self,
        ctx: &Context,
        user_id: UserId,
    ) -> anyhow::Result<()> {
        match first_shared_guild(ctx, user_id).await {
            Some(guild_id) => self.refresh_guild(ctx, guild_id).await,
            None => {
                debug!("No shared guild found for user {}; roster unchanged", user_id);
                Ok(())
            }
        }
    }

    pub async fn refresh_guild(
        &self,
        ctx: &Context,
        guild_id: GuildId,
    ) -> anyhow::Result<()> {
        let Some(channel_id) = self.ensure_channel(ctx, guild_id).await? else {
            return Ok(());
        };

        let entries = self.collect_entries(ctx, guild_id).await;
        let content = roster::render(&entries);

        // Edit the tracked message in place; any failure (deleted message,
        // stale reference) falls through to a fresh post.
        if let Some(r) = self.store.roster_ref(guild_id.get()) {
            match ChannelId::new(r.channel_id)
                .edit_message(
                    ctx,
                    MessageId::new(r.message_id),
                    EditMessage::new().content(&content),
                )
                .await
            {
                Ok(_) => return Ok(()),
                Err(e) => debug!(
                    "Editing roster message {} in guild {} failed, reposting: {}",
                    r.message_id, guild_id, e
                ),
            }
        }

        let message = channel_id
            .send_message(ctx, CreateMessage::new().content(&content))
            .await?;
        self.store.set_roster_ref(
            guild_id.get(),
            RosterRef {
                channel_id: channel_id.get(),
                message_id: message.id.get(),
            },
        )?;
        info!(
            "Posted roster message {} in guild {}",
            message.id, guild_id
        );

        if let Err(e) = message.pin(ctx).await {
            warn!("Could not pin roster message in guild {}: {}", guild_id, e);
        }
        Ok(())
    }

    /// Checks whether the pinned roster text on the first shared guild
    /// mentions any of the given names. Returns None when the published
    /// roster could not be located.
    pub async fn published_roster_mentions(
        &self,
        ctx: &Context,
        user_id: UserId,
        names: &[&str],
    ) -> Option<bool> {
        let guild_id = first_shared_guild(ctx, user_id).await?;
        let channel_id = self.find_channel(ctx, guild_id).await?;
        let pins = channel_id.pins(ctx).await.ok()?;
        let latest = pins.first()?;
        Some(
            names
                .iter()
                .any(|name| roster::contains_name(&latest.content, name)),
        )
    }

    async fn find_channel(
        &self,
        ctx: &Context,
        guild_id: GuildId,
    ) -> Option<ChannelId> {
        let channels = guild_id.channels(&ctx.http).await.ok()?;
        channels
            .values()
            .find(|c| c.kind == ChannelType::Text && c.name == self.channel_name)
            .map(|c| c.id)
    }

    /// Finds the dedicated channel, creating it read-only for @everyone when
    /// missing. Returns None when creation is not permitted.
    async fn ensure_channel(
        &self,
        ctx: &Context,
        guild_id: GuildId,
    ) -> anyhow::Result<Option<ChannelId>> {
        if let Some(channel_id) = self.find_channel(ctx, guild_id).await {
            return Ok(Some(channel_id));
        }

        let everyone = RoleId::new(guild_id.get());
        let builder = CreateChannel::new(&self.channel_name)
            .kind(ChannelType::Text)
            .permissions(vec![PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL,
                deny: Permissions::SEND_MESSAGES,
                kind: PermissionOverwriteType::Role(everyone),
            }]);

        match guild_id.create_channel(ctx, builder).await {
            Ok(channel) => {
                info!(
                    "Created roster channel #{} in guild {}",
                    self.channel_name, guild_id
                );
                Ok(Some(channel.id))
            }
            Err(e) => {
                warn!(
                    "Cannot create roster channel in guild {}: {}",
                    guild_id, e
                );
                Ok(None)
            }
        }
    }

    /// Protected players that are members of the guild, with their current
    /// server display names.
    async fn collect_entries(
        &self,
        ctx: &Context,
        guild_id: GuildId,
    ) -> Vec<RosterEntry> {
        let mut entries = Vec::new();
        for (user_id, record) in self.store.protected_players() {
            let Ok(user_id) = user_id.parse::<u64>() else {
                continue;
            };
            let Ok(member) = guild_id.member(ctx, UserId::new(user_id)).await else {
                continue;
            };
            entries.push(RosterEntry {
                character_name: record.character_name,
                display_name: member.display_name().to_string(),
            });
        }
        entries
    }
}

/// First guild in the gateway cache the user is a member of.
pub async fn first_shared_guild(ctx: &Context, user_id: UserId) -> Option<GuildId> {
    for guild_id in ctx.cache.guilds() {
        if guild_id.member(ctx, user_id).await.is_ok() {
            return Some(guild_id);
        }
    }
    None
}
