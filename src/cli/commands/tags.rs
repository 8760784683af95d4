//! tags command - List every known tag across both lists

use anyhow::Result;

use super::Context;
use crate::ui::output;

/// List the union of both tiers' tag vocabularies.
pub fn tags(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let tags = store.known_tags();

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&tags)?);
        return Ok(());
    }

    for tag in tags {
        output::print(tag, ctx.verbosity);
    }
    Ok(())
}
