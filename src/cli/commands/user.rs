//! user command - Edit the userlist
//!
//! # Locking
//!
//! Mutating actions take an exclusive OS-level lock on `<userlist>.lock`
//! for their whole read-modify-write cycle, so two `mls user` invocations
//! cannot interleave. The library itself stays lock-free; this guard is a
//! CLI concern.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context as _, Result};
use fs2::FileExt;

use super::Context;
use crate::cli::args::UserAction;
use crate::core::metadata::schema::EntityMetadata;
use crate::core::types::EntityName;
use crate::ui::output;

/// Dispatch a userlist editing action.
pub fn user(ctx: &Context, action: UserAction) -> Result<()> {
    match action {
        UserAction::Set { file } => set(ctx, &file),
        UserAction::Discard { name } => discard(ctx, &name),
        UserAction::Clear => clear(ctx),
        UserAction::Write { output, force } => write(ctx, &output, force),
    }
}

fn set(ctx: &Context, file: &Path) -> Result<()> {
    let userlist = ctx.require_userlist()?.clone();
    let _lock = UserlistLock::acquire(&userlist)?;

    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read '{}'", file.display()))?;
    let metadata: EntityMetadata = serde_yaml::from_str(&contents)
        .with_context(|| format!("'{}' is not a valid entity record", file.display()))?;
    let name = metadata.name.clone();

    let mut store = open_for_edit(ctx, &userlist)?;
    store.set_user_metadata(metadata);
    store.write_userlist(&userlist, true)?;

    output::print(format!("set user metadata for {name}"), ctx.verbosity);
    Ok(())
}

fn discard(ctx: &Context, name: &str) -> Result<()> {
    let userlist = ctx.require_userlist()?.clone();
    let _lock = UserlistLock::acquire(&userlist)?;

    let name = EntityName::new(name)?;
    let mut store = open_for_edit(ctx, &userlist)?;

    if store.discard_user_metadata(&name) {
        store.write_userlist(&userlist, true)?;
        output::print(format!("discarded user metadata for {name}"), ctx.verbosity);
    } else {
        output::warn(format!("no user metadata for {name}"), ctx.verbosity);
    }
    Ok(())
}

fn clear(ctx: &Context) -> Result<()> {
    let userlist = ctx.require_userlist()?.clone();
    let _lock = UserlistLock::acquire(&userlist)?;

    let mut store = open_for_edit(ctx, &userlist)?;
    store.discard_all_user_metadata();
    store.write_userlist(&userlist, true)?;

    output::print("discarded all user metadata", ctx.verbosity);
    Ok(())
}

fn write(ctx: &Context, output_path: &Path, force: bool) -> Result<()> {
    let store = ctx.open_store()?;
    store.write_userlist(output_path, force)?;

    output::print(
        format!("wrote userlist to {}", output_path.display()),
        ctx.verbosity,
    );
    Ok(())
}

/// Load a store for a userlist edit.
///
/// The userlist may not exist yet on first edit; that starts from an empty
/// list rather than failing.
fn open_for_edit(ctx: &Context, userlist: &Path) -> Result<crate::core::metadata::store::MetadataStore> {
    let existing = userlist.exists().then_some(userlist);
    let edit_ctx = Context {
        userlist: existing.map(Path::to_path_buf),
        ..ctx.clone()
    };
    edit_ctx.open_store()
}

/// Exclusive lock guard for a userlist file.
///
/// The lock is automatically released when this guard is dropped, even if
/// the edit panics.
struct UserlistLock {
    file: File,
}

impl UserlistLock {
    fn acquire(userlist: &Path) -> Result<Self> {
        let lock_path = lock_path_for(userlist);
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .with_context(|| format!("failed to create lock file '{}'", lock_path.display()))?;

        file.try_lock_exclusive()
            .map_err(|_| anyhow!("userlist is locked by another process"))?;

        Ok(Self { file })
    }
}

impl Drop for UserlistLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

fn lock_path_for(userlist: &Path) -> PathBuf {
    let mut os = userlist.as_os_str().to_os_string();
    os.push(".lock");
    PathBuf::from(os)
}
