use crate::store;
use crate::{Context, Error};
use tracing::warn;

/// Protect yourself for today's raids
#[poise::command(prefix_command)]
pub async fn protect(ctx: Context<'_>) -> Result<(), Error> {
    if !super::require_dm(&ctx).await? {
        return Ok(());
    }

    let user_id = ctx.author().id;
    let today = store::current_day_name();
    if !ctx.data().store.protect(&user_id.to_string(), &today)? {
        ctx.say(format!(
            "⚠️ You're not registered. Use `{}register [Name]`.",
            ctx.data().config.command_prefix
        ))
        .await?;
        return Ok(());
    }

    if let Err(e) = ctx
        .data()
        .roster
        .refresh_for_user(ctx.serenity_context(), user_id)
        .await
    {
        warn!("Roster refresh after protect failed for {}: {}", user_id, e);
    }

    ctx.say(format!("✅ You are now protected for **{today}**."))
        .await?;
    Ok(())
}

/// Remove your raid protection
#[poise::command(prefix_command)]
pub async fn unprotect(ctx: Context<'_>) -> Result<(), Error> {
    if !super::require_dm(&ctx).await? {
        return Ok(());
    }

    let user_id = ctx.author().id;
    if !ctx.data().store.unprotect(&user_id.to_string())? {
        ctx.say("⚠️ You're not registered.").await?;
        return Ok(());
    }

    if let Err(e) = ctx
        .data()
        .roster
        .refresh_for_user(ctx.serenity_context(), user_id)
        .await
    {
        warn!(
            "Roster refresh after unprotect failed for {}: {}",
            user_id, e
        );
    }

    ctx.say("🗑️ Your raid protection has been removed.").await?;
    Ok(())
}

/// View your protection status
#[poise::command(prefix_command)]
pub async fn status(ctx: Context<'_>) -> Result<(), Error> {
    if !super::require_dm(&ctx).await? {
        return Ok(());
    }

    let user_id = ctx.author().id;
    let Some(record) = ctx.data().store.get(&user_id.to_string()) else {
        ctx.say("⚠️ You are not registered.").await?;
        return Ok(());
    };

    let name = record.display_name().to_string();
    let protected = record.is_protected();
    let mut reply = if protected {
        format!("✅ Your tribe **{name}** is protected today.")
    } else {
        format!("❌ Your tribe **{name}** is not on the protection list for today.")
    };

    // The published message can lag behind the records (e.g. right after the
    // daily clear); flag that instead of trusting the rendered text.
    if let Some(listed) = ctx
        .data()
        .roster
        .published_roster_mentions(
            ctx.serenity_context(),
            user_id,
            &[name.as_str(), record.character_name.as_str()],
        )
        .await
    {
        if listed != protected {
            reply.push_str(
                "\nℹ️ The pinned list is out of date; it will refresh on the next change.",
            );
        }
    }

    ctx.say(reply).await?;
    Ok(())
}
