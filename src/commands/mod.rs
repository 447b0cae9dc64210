pub mod account;
pub mod help;
pub mod protection;

use crate::{Context, Error};

/// Commands that touch protection state must be issued in a DM. Replies with
/// a pointer and returns false otherwise.
pub(crate) async fn require_dm(ctx: &Context<'_>) -> Result<bool, Error> {
    if ctx.guild_id().is_some() {
        ctx.say("⚠️ Use this command in DMs.").await?;
        return Ok(false);
    }
    Ok(true)
}
