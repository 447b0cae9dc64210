use crate::{Context, Error};

/// Show raid protection commands
#[poise::command(prefix_command)]
pub async fn help(ctx: Context<'_>) -> Result<(), Error> {
    if !super::require_dm(&ctx).await? {
        return Ok(());
    }

    let p = &ctx.data().config.command_prefix;
    ctx.say(format!(
        "**🛡️ Raid Protection Bot Help**\n\n\
         Commands:\n\
         - `{p}register [Name]` – Register your character\n\
         - `{p}protect` – Protect yourself for today\n\
         - `{p}unprotect` – Remove today's protection\n\
         - `{p}status` – View your protection status\n\
         - `{p}unregister` – Remove your registration"
    ))
    .await?;
    Ok(())
}
