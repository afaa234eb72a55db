//! `vercomp check` — validate config and connectivity without changing anything.

use std::path::Path;

use anyhow::Result;
use clap::Args;

use vercomp_core::Selection;

use super::{connect, load_config};

/// Arguments for `vercomp check`.
#[derive(Args, Debug)]
pub struct CheckArgs {}

impl CheckArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let (client, user) = connect(&config)?;

        println!("✓ Logged in to {} as {user}", client.base_url());
        println!(
            "✓ {} -> {} (components: {}, versions: {}{})",
            config.source_project,
            config.dest_project,
            describe(&config.components),
            describe(&config.versions),
            if config.unarchive { ", unarchive" } else { "" },
        );
        Ok(())
    }
}

fn describe(selection: &Selection) -> String {
    match selection {
        Selection::None => "none".to_string(),
        Selection::All => "all".to_string(),
        Selection::Named(names) => format!("{} named", names.len()),
    }
}
