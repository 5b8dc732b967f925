//! taskboard init command implementation.

use serde::Serialize;

use crate::board::Board;
use crate::cli::Context;
use crate::config;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::workspace::Workspace;

#[derive(Serialize)]
struct InitOutput {
    workspace: Workspace,
    config_created: bool,
}

pub fn run(ctx: &Context, title: &str) -> Result<()> {
    let workspace = Workspace::resolve(&ctx.config);
    workspace.ensure()?;

    let mut human = HumanOutput::new("Board initialized");
    let config_created = !workspace.config_path.exists();
    if config_created {
        let mut board = Board::new(title.trim());
        board.columns = Board::default_columns();
        config::save(&workspace.config_path, &board, "")?;
    } else {
        let loaded = config::load(&workspace.config_path)?;
        for warning in &loaded.warnings {
            human.warning(warning.to_string());
        }
    }

    human.field("Config", workspace.config_path.display().to_string());
    human.field("Active", workspace.active_dir.display().to_string());
    human.field("Archive", workspace.archive_dir.display().to_string());
    if !config_created {
        human.field("Existing config kept", "");
    }

    let output = InitOutput {
        workspace,
        config_created,
    };
    emit_success(ctx.output(), "init", &output, Some(&human))
}
