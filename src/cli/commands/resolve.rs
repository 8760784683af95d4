//! resolve command - Show the effective metadata for one entity

use anyhow::Result;

use super::Context;
use crate::core::metadata::schema::{EntityMetadata, TagState};
use crate::core::types::EntityName;
use crate::ui::output;

/// Show the effective metadata for one entity.
pub fn resolve(
    ctx: &Context,
    name: &str,
    userlist_only: bool,
    no_userlist: bool,
    eval: bool,
) -> Result<()> {
    let name = EntityName::new(name)?;
    let store = ctx.open_store()?;

    let metadata = if userlist_only {
        store.resolve_userlist_only(&name, eval)?
    } else {
        store.resolve(&name, !no_userlist, eval)?
    };

    if ctx.json {
        println!("{}", serde_json::to_string_pretty(&metadata)?);
        return Ok(());
    }

    output::print(render_entity(&metadata), ctx.verbosity);
    Ok(())
}

/// Multi-line human rendering of a resolved record.
fn render_entity(metadata: &EntityMetadata) -> String {
    let mut lines = vec![metadata.name.to_string()];

    if !metadata.enabled {
        lines.push("  (disabled)".to_string());
    }

    if let Some(condition) = &metadata.condition {
        lines.push(format!("  condition: {condition}"));
    }

    for tag in &metadata.tags {
        let sign = match tag.state {
            TagState::Add => '+',
            TagState::Remove => '-',
        };
        match &tag.condition {
            Some(condition) => lines.push(format!("  {sign}{} [{condition}]", tag.name)),
            None => lines.push(format!("  {sign}{}", tag.name)),
        }
    }

    for message in &metadata.messages {
        lines.push(format!("  {}", output::render_message(message)));
    }

    for info in &metadata.dirty {
        let mut line = format!("  dirty: {:08X}", info.checksum);
        if !info.utility.is_empty() {
            line.push_str(&format!(" (clean with {})", info.utility));
        }
        lines.push(line);
    }

    for file in &metadata.requirements {
        lines.push(format!("  requires: {}", file.name));
    }

    for file in &metadata.incompatibilities {
        lines.push(format!("  incompatible: {}", file.name));
    }

    if lines.len() == 1 {
        lines.push("  (no metadata)".to_string());
    }

    lines.join("\n")
}
