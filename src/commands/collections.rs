//! Collection listing and creation

use crate::cli::CollectionCommands;
use crate::{CanopyError, db::Database};

type Result<T> = std::result::Result<T, CanopyError>;

/// Execute a collections subcommand
///
/// # Errors
/// Returns an error if the database cannot be read or written.
pub fn execute(db: &Database, command: &CollectionCommands, quiet: bool) -> Result<()> {
    match command {
        CollectionCommands::List => list(db, quiet),
        CollectionCommands::Add { id, name } => {
            if name.trim().is_empty() {
                return Err(CanopyError::InvalidInput("Collection name cannot be empty".into()));
            }
            let existed = db.collection_name(id)?.is_some();
            db.insert_collection(id, name)?;
            if !quiet {
                let verb = if existed { "Renamed" } else { "Created" };
                println!("{verb} collection '{name}' [{id}]");
            }
            Ok(())
        }
    }
}

fn list(db: &Database, quiet: bool) -> Result<()> {
    let collections = db.list_collections()?;

    if collections.is_empty() {
        if !quiet {
            println!("No collections found in database.");
            println!("Create one with: canopy collections add <id> <name>");
        }
        return Ok(());
    }

    if !quiet {
        println!("Collections in database:");
    }
    for (id, name) in collections {
        if quiet {
            println!("{id}");
        } else {
            let count = db.items_in_collection(&id)?.len();
            println!("  {name} [{id}] ({count} item(s))");
        }
    }
    Ok(())
}
