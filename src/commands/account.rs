use crate::publisher;
use crate::store::RegisterOutcome;
use crate::{Context, Error};
use serenity::all::{CreateMessage, EditMember};
use tracing::{debug, info, warn};

/// Register your character for raid protection
#[poise::command(prefix_command)]
pub async fn register(
    ctx: Context<'_>,
    #[rest]
    #[description = "Your in-game character name"]
    character_name: Option<String>,
) -> Result<(), Error> {
    let prefix = ctx.data().config.command_prefix.clone();
    let name = character_name
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());
    let Some(name) = name else {
        ctx.say(format!(
            "⚠️ Please provide a character name. `{prefix}register [Name]`"
        ))
        .await?;
        return Ok(());
    };

    // Keep the shared channel clean when invoked in a guild
    if ctx.guild_id().is_some() {
        if let poise::Context::Prefix(prefix_ctx) = ctx {
            if let Err(e) = prefix_ctx.msg.delete(ctx.serenity_context()).await {
                debug!("Could not delete register invocation: {}", e);
            }
        }
    }

    let user_id = ctx.author().id;
    match ctx.data().store.register(&user_id.to_string(), &name)? {
        RegisterOutcome::AlreadyRegistered => {
            dm(
                &ctx,
                format!("⚠️ You're already registered. Use `{prefix}status` or `{prefix}protect`."),
            )
            .await?;
        }
        RegisterOutcome::Created => {
            info!("Registered user {} as {}", user_id, name);
            if let Some(guild_id) = ctx.guild_id() {
                let edit = EditMember::new().nickname(&name);
                if let Err(e) = guild_id
                    .edit_member(ctx.serenity_context(), user_id, edit)
                    .await
                {
                    warn!("Could not rename {} to {}: {}", ctx.author().name, name, e);
                }
            }
            dm(
                &ctx,
                format!(
                    "✅ Registered as **{name}**!\n\n\
                     Use these DM commands:\n\
                     `{prefix}protect`\n`{prefix}status`\n`{prefix}unprotect`\n`{prefix}unregister`\n\
                     `{prefix}help` for help."
                ),
            )
            .await?;
        }
    }
    Ok(())
}

/// Remove your registration
#[poise::command(prefix_command)]
pub async fn unregister(ctx: Context<'_>) -> Result<(), Error> {
    if !super::require_dm(&ctx).await? {
        return Ok(());
    }

    let user_id = ctx.author().id;
    if ctx
        .data()
        .store
        .unregister(&user_id.to_string())?
        .is_none()
    {
        ctx.say("⚠️ You're not registered.").await?;
        return Ok(());
    }
    info!("Unregistered user {}", user_id);

    // Best-effort nickname reset on the first shared guild
    if let Some(guild_id) =
        publisher::first_shared_guild(ctx.serenity_context(), user_id).await
    {
        let edit = EditMember::new().nickname("");
        if let Err(e) = guild_id
            .edit_member(ctx.serenity_context(), user_id, edit)
            .await
        {
            warn!(
                "Could not reset nickname for {}: {}",
                ctx.author().name, e
            );
        }
    }

    ctx.say("✅ You've been unregistered.").await?;
    Ok(())
}

async fn dm(ctx: &Context<'_>, content: String) -> Result<(), Error> {
    ctx.author()
        .dm(ctx.serenity_context(), CreateMessage::new().content(content))
        .await?;
    Ok(())
}
