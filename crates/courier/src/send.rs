// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `courier send`: one-shot manual dispatch outside the campaign table.
//!
//! Senders and the template come from flags, or are picked interactively
//! when a flag is missing.

use std::path::Path;

use colored::Colorize;
use courier_config::CourierConfig;
use courier_core::{CourierError, SenderId, TemplateStore};
use courier_sender::list_identities;
use courier_template::JsonTemplateStore;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::app::App;
use crate::commands::print_campaign;

pub async fn run_send(
    config: &CourierConfig,
    senders: Vec<String>,
    template: Option<String>,
) -> Result<(), CourierError> {
    let mut editor: Option<DefaultEditor> = None;

    let senders: Vec<SenderId> = if senders.is_empty() {
        let available = list_identities(Path::new(&config.sender.auth_dir)).await?;
        if available.is_empty() {
            return Err(CourierError::Config(format!(
                "no paired identities under {}; pair one first or pass --sender",
                config.sender.auth_dir
            )));
        }
        let names: Vec<String> = available.iter().map(|s| s.to_string()).collect();
        let picked = prompt_many(editor_for(&mut editor)?, "Senders", &names)?;
        picked.into_iter().map(|i| available[i].clone()).collect()
    } else {
        senders
            .iter()
            .map(|s| SenderId::parse(s))
            .collect::<Result<_, _>>()?
    };

    let template = match template {
        Some(id) => id,
        None => {
            let store = JsonTemplateStore::new(&config.templates.path);
            let mut ids: Vec<String> = store.load_templates().await?.into_keys().collect();
            ids.sort();
            if ids.is_empty() {
                return Err(CourierError::Config(format!(
                    "no templates in {}",
                    config.templates.path
                )));
            }
            let picked = prompt_one(editor_for(&mut editor)?, "Template", &ids)?;
            ids.swap_remove(picked)
        }
    };

    println!(
        "sending template {} through {}",
        template.bold(),
        senders
            .iter()
            .map(SenderId::as_str)
            .collect::<Vec<_>>()
            .join(", ")
            .bold()
    );

    let app = App::build(config)?;
    let result = app.engine.run_manual(&senders, &template).await;
    app.shutdown().await;
    print_campaign(&result?);
    Ok(())
}

fn editor_for(slot: &mut Option<DefaultEditor>) -> Result<&mut DefaultEditor, CourierError> {
    if slot.is_none() {
        let editor = DefaultEditor::new()
            .map_err(|e| CourierError::Internal(format!("failed to initialize readline: {e}")))?;
        *slot = Some(editor);
    }
    slot.as_mut()
        .ok_or_else(|| CourierError::Internal("readline editor missing".into()))
}

fn print_choices(title: &str, options: &[String]) {
    println!("{}", title.bold().green());
    for (i, option) in options.iter().enumerate() {
        println!("  {} {option}", format!("{}.", i + 1).yellow());
    }
}

fn read_line(editor: &mut DefaultEditor, prompt: &str) -> Result<String, CourierError> {
    match editor.readline(&format!("{}> ", prompt.green())) {
        Ok(line) => Ok(line),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
            Err(CourierError::Internal("cancelled".into()))
        }
        Err(e) => Err(CourierError::Internal(format!("readline failed: {e}"))),
    }
}

fn prompt_many(
    editor: &mut DefaultEditor,
    title: &str,
    options: &[String],
) -> Result<Vec<usize>, CourierError> {
    print_choices(title, options);
    loop {
        let line = read_line(editor, "numbers separated by commas, or `all`")?;
        match parse_selection(&line, options.len()) {
            Ok(picked) => return Ok(picked),
            Err(msg) => eprintln!("{}: {msg}", "invalid".red()),
        }
    }
}

fn prompt_one(
    editor: &mut DefaultEditor,
    title: &str,
    options: &[String],
) -> Result<usize, CourierError> {
    print_choices(title, options);
    loop {
        let line = read_line(editor, "number")?;
        match parse_selection(&line, options.len()) {
            Ok(picked) if picked.len() == 1 => return Ok(picked[0]),
            Ok(_) => eprintln!("{}: pick exactly one", "invalid".red()),
            Err(msg) => eprintln!("{}: {msg}", "invalid".red()),
        }
    }
}

/// Parse `1,3` or `all` into zero-based indices, deduplicated, in input order.
pub fn parse_selection(input: &str, len: usize) -> Result<Vec<usize>, String> {
    let input = input.trim();
    if input.eq_ignore_ascii_case("all") {
        return Ok((0..len).collect());
    }
    let mut picked = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let n: usize = part
            .parse()
            .map_err(|_| format!("`{part}` is not a number"))?;
        if n == 0 || n > len {
            return Err(format!("{n} is out of range 1-{len}"));
        }
        if !picked.contains(&(n - 1)) {
            picked.push(n - 1);
        }
    }
    if picked.is_empty() {
        return Err("nothing selected".into());
    }
    Ok(picked)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_accepts_lists_and_all() {
        assert_eq!(parse_selection("1, 3", 3), Ok(vec![0, 2]));
        assert_eq!(parse_selection("ALL", 2), Ok(vec![0, 1]));
        assert_eq!(parse_selection("2,2,1", 2), Ok(vec![1, 0]));
    }

    #[test]
    fn selection_rejects_bad_input() {
        assert!(parse_selection("", 3).is_err());
        assert!(parse_selection("0", 3).is_err());
        assert!(parse_selection("4", 3).is_err());
        assert!(parse_selection("one", 3).is_err());
    }
}
