//! update command - Update the masterlist from its remote

use anyhow::{bail, Result};

use super::Context;
use crate::remote::GitRemote;
use crate::ui::output;

/// Update the masterlist, or check whether it is current with `--check`.
pub fn update(ctx: &Context, url: Option<String>, branch: Option<String>, check: bool) -> Result<()> {
    let path = ctx.require_masterlist()?;
    let branch = branch.unwrap_or_else(|| ctx.branch.clone());
    let remote = GitRemote::new();

    let mut store = ctx.open_store()?;

    if check {
        let latest = store.is_latest_masterlist(path, &remote, &branch)?;
        if ctx.json {
            println!("{}", serde_json::json!({ "latest": latest }));
        } else if latest {
            output::print("masterlist is up to date", ctx.verbosity);
        } else {
            output::print("masterlist is behind the remote", ctx.verbosity);
        }
        return Ok(());
    }

    let url = match url.or_else(|| ctx.remote_url.clone()) {
        Some(url) => url,
        None => bail!("no remote URL; pass --url or set remote.url in the config file"),
    };

    let changed = store.update_masterlist(path, &remote, &url, &branch)?;

    if ctx.json {
        println!("{}", serde_json::json!({ "changed": changed }));
    } else if changed {
        output::print("masterlist updated", ctx.verbosity);
    } else {
        output::print("masterlist already up to date", ctx.verbosity);
    }
    Ok(())
}
