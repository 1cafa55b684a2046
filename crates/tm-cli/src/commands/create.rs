//! Create command implementation

use anyhow::{Context, Result};

use crate::cli::{CreateArgs, GlobalArgs};
use crate::commands::common::load_project;

/// Execute the create command
pub fn execute(args: &CreateArgs, global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    let description = args.name.join(" ");

    let created = tm_migrate::create(&project.source(), &description)
        .with_context(|| format!("Failed to create migration '{description}'"))?;

    println!("Created {}", created.up);
    println!("Created {}", created.down);
    Ok(())
}
