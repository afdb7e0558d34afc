// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot subcommands: `tick`, `templates`, `identities`, `check`.

use std::path::Path;

use chrono::NaiveDateTime;
use colored::Colorize;
use courier_config::CourierConfig;
use courier_core::{CourierError, TemplateStore};
use courier_engine::{CampaignOutcome, CampaignReport, TickReport};
use courier_sender::list_identities;
use courier_template::{JsonTemplateStore, placeholders};

use crate::app::App;

/// Accepted `--at` format, the same as the directory's date and time cells.
const AT_FORMAT: &str = "%d/%m/%Y %H:%M";

pub fn parse_at(text: &str) -> Result<NaiveDateTime, CourierError> {
    NaiveDateTime::parse_from_str(text.trim(), AT_FORMAT).map_err(|e| {
        CourierError::Config(format!("invalid --at `{text}` (expected DD/MM/YYYY HH:MM): {e}"))
    })
}

/// Run a single tick, at `at` or the current local time.
pub async fn run_tick(config: &CourierConfig, at: Option<&str>) -> Result<(), CourierError> {
    let now = match at {
        Some(text) => parse_at(text)?,
        None => chrono::Local::now().naive_local(),
    };
    let app = App::build(config)?;
    let result = app.engine.run_tick(now).await;
    app.shutdown().await;
    print_tick(&result?);
    Ok(())
}

fn print_tick(report: &TickReport) {
    if report.due == 0 {
        println!("no campaigns due at {}", report.now.format(AT_FORMAT));
        return;
    }
    for campaign in &report.campaigns {
        print_campaign(campaign);
    }
    println!(
        "{} campaign(s): {} sent, {} errored",
        report.due,
        report.sent(),
        report.errored()
    );
}

pub fn print_campaign(report: &CampaignReport) {
    let outcome = match &report.outcome {
        CampaignOutcome::Finished => "finished".green(),
        CampaignOutcome::Error(reason) => format!("error: {reason}").red(),
        CampaignOutcome::Skipped(reason) => format!("skipped: {reason}").yellow(),
    };
    println!(
        "{} [{}] attempted {}, sent {}, errored {}",
        report.name.bold(),
        outcome,
        report.attempted,
        report.sent,
        report.errored
    );
    if report.write_failures > 0 {
        println!(
            "  {}",
            format!("{} status write(s) not persisted, see the log", report.write_failures).yellow()
        );
    }
}

pub async fn run_templates(config: &CourierConfig) -> Result<(), CourierError> {
    let store = JsonTemplateStore::new(&config.templates.path);
    let templates = store.load_templates().await?;
    let mut ids: Vec<&String> = templates.keys().collect();
    ids.sort();
    for id in ids {
        let template = &templates[id];
        let fields = placeholders(&template.body);
        println!(
            "{}  {}  {}",
            id.bold(),
            template.name,
            format!("[{}]", fields.join(", ")).dimmed()
        );
    }
    Ok(())
}

pub async fn run_identities(config: &CourierConfig) -> Result<(), CourierError> {
    let identities = list_identities(Path::new(&config.sender.auth_dir)).await?;
    if identities.is_empty() {
        println!("no paired identities under {}", config.sender.auth_dir);
    }
    for identity in identities {
        println!("{identity}");
    }
    Ok(())
}

/// Print a summary of a configuration that already passed validation.
pub fn run_check(config: &CourierConfig) {
    println!("{}", "configuration OK".green());
    println!("  directory backend: {:?}", config.directory.backend);
    println!("  templates: {}", config.templates.path);
    println!("  bridge: {}", config.sender.bridge_url);
    println!("  tick interval: {}s", config.engine.tick_interval_secs);
    println!(
        "  gateway: {}",
        if config.gateway.enabled {
            format!("{}:{}", config.gateway.host, config.gateway.port)
        } else {
            "disabled".to_string()
        }
    );
}
