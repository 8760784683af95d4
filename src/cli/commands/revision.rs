//! revision command - Show the masterlist revision

use anyhow::Result;

use super::Context;
use crate::remote::GitRemote;
use crate::ui::output;

/// Show the revision the masterlist was checked out from.
pub fn revision(ctx: &Context, short: bool) -> Result<()> {
    let path = ctx.require_masterlist()?;
    let remote = GitRemote::new();

    let store = ctx.open_store()?;
    let info = store.masterlist_revision(path, &remote, short)?;

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let suffix = if info.is_modified {
        " (edited locally)"
    } else {
        ""
    };
    output::print(
        format!("{} ({}){}", info.revision, info.date, suffix),
        ctx.verbosity,
    );
    Ok(())
}
