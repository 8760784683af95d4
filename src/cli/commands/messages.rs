//! messages command - Show list-level messages from both lists

use anyhow::Result;

use super::Context;
use crate::ui::output;

/// Show list-level messages, masterlist first.
pub fn messages(ctx: &Context, eval: bool) -> Result<()> {
    let store = ctx.open_store()?;
    let messages = store.general_messages(eval)?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    for message in &messages {
        output::print(output::render_message(message), ctx.verbosity);
    }
    Ok(())
}
