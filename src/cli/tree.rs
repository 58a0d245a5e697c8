//! Tree command - show the PR dependency forest

use crate::cli::context::CommandContext;
use crate::cli::style::{Stylize, check, spinner_style};
use anstream::{print, println};
use indicatif::ProgressBar;
use prstack::error::{Error, Result};
use prstack::model::Repository;
use prstack::stack::{PrTree, TreeJson, build_forest, render_forest, render_forest_indented};
use std::time::Duration;

/// Options for the tree command
#[derive(Debug, Clone, Default)]
pub struct TreeOptions {
    /// Indented ASCII tree instead of the horizontal diagram
    pub indent: bool,
    /// Emit JSON
    pub json: bool,
    /// Render width from `--width` or `COLUMNS`
    pub width: Option<usize>,
}

/// Run the tree command
pub async fn run_tree(ctx: &CommandContext, options: TreeOptions) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(spinner_style());
    spinner.set_message(format!(
        "Fetching open PRs for {}...",
        ctx.repository.info().full_name.emphasis()
    ));
    spinner.enable_steady_tick(Duration::from_millis(80));

    let prs = ctx.repository.open_pull_requests().await;
    let prs = match prs {
        Ok(prs) => {
            spinner.finish_and_clear();
            prs
        }
        Err(e) => {
            spinner.abandon();
            return Err(e);
        }
    };

    let forest = build_forest(&prs)?;

    if options.json {
        let nodes: Vec<TreeJson> = forest.iter().map(PrTree::to_json_node).collect();
        let json = serde_json::to_string_pretty(&nodes)
            .map_err(|e| Error::Internal(format!("failed to serialize tree: {e}")))?;
        println!("{json}");
        return Ok(());
    }

    if prs.is_empty() {
        println!("{}", "No open pull requests found.".muted());
        return Ok(());
    }

    if options.indent {
        print!("{}", render_forest_indented(&forest));
    } else {
        let width = ctx.config.render_width(options.width, terminal_width());
        print!("{}", render_forest(&forest, width));
    }

    println!();
    println!(
        "{} {} open PR(s) in {} stack(s)",
        check(),
        prs.len().accent(),
        forest.len().accent()
    );
    Ok(())
}

/// Column count of stdout when it is a terminal
fn terminal_width() -> Option<usize> {
    console::Term::stdout()
        .size_checked()
        .map(|(_rows, cols)| usize::from(cols))
}
