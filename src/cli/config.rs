//! Config command - show or initialize configuration

use crate::cli::style::{Stylize, check};
use anstream::println;
use prstack::config::{Config, load_config, repo_config_path, save_config, user_config_path};
use prstack::error::{Error, Result};
use prstack::repo::GitWorkspace;
use std::path::Path;

/// Run the config command
///
/// Inside a checkout `--init` writes the repository-local file, elsewhere
/// the user file.
pub fn run_config(path: &Path, init: bool) -> Result<()> {
    let workspace = GitWorkspace::open(path).ok();
    let root = workspace.as_ref().map(GitWorkspace::root);

    if init {
        let target = match root {
            Some(root) => repo_config_path(root),
            None => user_config_path()
                .ok_or_else(|| Error::Config("no user config directory".to_string()))?,
        };
        if target.exists() {
            println!(
                "{} {}",
                "Config already exists at".muted(),
                target.display()
            );
            return Ok(());
        }
        save_config(&target, &Config::default())?;
        println!("{} Wrote {}", check(), target.display().to_string().accent());
        return Ok(());
    }

    let loaded = load_config(root)?;
    match &loaded.path {
        Some(p) => println!("{} {}", "Config file:".emphasis(), p.display()),
        None => println!(
            "{} {}",
            "Config file:".emphasis(),
            "(none, using defaults)".muted()
        ),
    }
    println!();

    let content = toml::to_string_pretty(&loaded.config)
        .map_err(|e| Error::Config(format!("failed to serialize config: {e}")))?;
    println!("{content}");
    Ok(())
}
