//! `vercomp clone` — converge the destination project onto the source project.

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use vercomp_sync::{
    diff::field_names, pipeline, ApplyResult, CloneReport, CloneRequest, FailurePolicy,
};

use super::{connect, load_config};

/// Arguments for `vercomp clone`.
#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Read and diff only; create and update nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Stop at the first entity that fails instead of carrying on.
    #[arg(long)]
    pub fail_fast: bool,

    /// Leave every cloned version unarchived, whatever the config says.
    #[arg(long)]
    pub unarchive: bool,

    /// Emit the run report as JSON.
    #[arg(long)]
    pub json: bool,
}

impl CloneArgs {
    pub fn run(self, config_path: Option<&Path>) -> Result<()> {
        let config = load_config(config_path)?;
        let (client, _user) = connect(&config)?;

        let mut request = CloneRequest::from_config(&config);
        request.dry_run = self.dry_run;
        request.unarchive |= self.unarchive;
        if self.fail_fast {
            request.failure_policy = FailurePolicy::FailFast;
        }

        let report = pipeline::run(&client, &request).with_context(|| {
            format!(
                "clone from {} to {} failed",
                request.source, request.dest
            )
        })?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("failed to serialize report")?
            );
        } else {
            print_report(&report);
        }

        let failed = report.failures().count();
        if failed > 0 {
            bail!(
                "{failed} entit{} could not be copied from {} to {}",
                if failed == 1 { "y" } else { "ies" },
                report.source,
                report.dest
            );
        }
        Ok(())
    }
}

#[derive(Tabled)]
struct KindRow {
    #[tabled(rename = "kind")]
    kind: String,
    #[tabled(rename = "selected")]
    selected: usize,
    #[tabled(rename = "created")]
    created: usize,
    #[tabled(rename = "updated")]
    updated: usize,
    #[tabled(rename = "unchanged")]
    unchanged: usize,
    #[tabled(rename = "failed")]
    failed: usize,
}

fn print_report(report: &CloneReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    if report.kinds.is_empty() {
        println!("{prefix}✓ {} -> {} — nothing selected", report.source, report.dest);
        return;
    }

    let elapsed = (report.finished_at - report.started_at).num_milliseconds();
    println!(
        "{prefix}{} -> {} ({elapsed} ms)",
        report.source.to_string().bold(),
        report.dest.to_string().bold()
    );

    let rows: Vec<KindRow> = report
        .kinds
        .iter()
        .map(|k| KindRow {
            kind: k.kind.plural().to_string(),
            selected: k.selected,
            created: k.created(),
            updated: k.updated(),
            unchanged: k.unchanged(),
            failed: k.failures.len(),
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    for kind in &report.kinds {
        for result in &kind.results {
            println!("  {}", describe(result));
        }
        for failure in &kind.failures {
            println!(
                "  {}  {} '{}': {}",
                "✗".red().bold(),
                failure.kind,
                failure.name,
                failure.error
            );
        }
    }
}

fn describe(result: &ApplyResult) -> String {
    let archive = |t: &Option<bool>| match t {
        Some(true) => " [archived first]",
        Some(false) => " [unarchived first]",
        None => "",
    };
    match result {
        ApplyResult::Created {
            name,
            archive_transition,
            ..
        } => format!("{}  {name}{}", "+".green().bold(), archive(archive_transition)),
        ApplyResult::Updated {
            name,
            fields,
            archive_transition,
            ..
        } => format!(
            "{}  {name} ({}){}",
            "✎".yellow().bold(),
            field_names(fields).join(", "),
            archive(archive_transition)
        ),
        ApplyResult::Unchanged { name } => format!("{}  {name}", "·".bright_black()),
        ApplyResult::WouldCreate { name } => format!("{}  {name} (new)", "~".cyan()),
        ApplyResult::WouldUpdate {
            name,
            fields,
            archive_transition,
        } => format!(
            "{}  {name} ({}){}",
            "~".cyan(),
            field_names(fields).join(", "),
            archive(archive_transition)
        ),
    }
}
