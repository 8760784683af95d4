//! taglist command - Export the minimal tag/dirty list

use std::path::Path;

use anyhow::Result;

use super::Context;
use crate::export;
use crate::ui::output;

/// Export the minimal list projected from the masterlist.
pub fn taglist(ctx: &Context, output_path: &Path, force: bool) -> Result<()> {
    let store = ctx.open_store()?;
    export::write_minimal(store.masterlist(), output_path, force)?;

    output::print(
        format!("wrote minimal list to {}", output_path.display()),
        ctx.verbosity,
    );
    Ok(())
}
