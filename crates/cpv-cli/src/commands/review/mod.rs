//! `cpv review`: an interactive, line-driven review session.
//!
//! Commands are read from stdin one line at a time and run to completion
//! before the next line is read. Ending the session (`quit` or end of
//! input) saves the current checkplot first.

mod input;
mod view;

use std::io::{IsTerminal, Write};

use anyhow::Context;
use cpv_config::CpvConfig;
use cpv_core::panels::build_panels;
use cpv_review::{
    Backend, Controller, ControllerOptions, NoticeLevel, Outcome, QueueNavigator, ReviewQueue,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::bootstrap;
use crate::cli::GlobalFlags;
use crate::cli::root_commands::ReviewArgs;
use crate::commands::shared::panel_rows;
use crate::output::output;

use self::input::{HELP, ReviewCommand};
use self::view::{StatusView, prompt, queue_rows};

/// Handle `cpv review`.
pub async fn handle(args: &ReviewArgs, config: &CpvConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    let queue = build_queue(args)?;
    let client = bootstrap::client(config)?;
    let updates = bootstrap::update_log(config)?;
    let mut controller = Controller::new(client, queue, updates, ControllerOptions::from(config));

    if controller.queue().is_empty() {
        if !flags.quiet {
            eprintln!("review queue is empty; use 'open <identifier>' to load a checkplot");
        }
    } else {
        let outcome = controller.next().await;
        report(&mut controller, &outcome, flags)?;
    }

    let interactive = std::io::stdin().is_terminal();
    let input = BufReader::new(tokio::io::stdin());
    run_session(&mut controller, input, interactive, config, flags).await
}

/// Read commands until `quit` or end of input, then save through `finish`.
///
/// A line that is not UTF-8 is reported and skipped. Any other read or
/// output failure ends the loop, but `finish` still runs before the error
/// is returned.
async fn run_session<B: Backend, R: AsyncBufRead + Unpin>(
    controller: &mut Controller<B, ReviewQueue>,
    input: R,
    interactive: bool,
    config: &CpvConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut lines = input.split(b'\n');
    let interrupted = loop {
        if interactive {
            print!("{}", prompt(controller));
            if let Err(error) = std::io::stdout().flush() {
                break Some(anyhow::Error::new(error).context("failed to write prompt"));
            }
        }

        let bytes = match lines.next_segment().await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => break None,
            Err(error) => {
                break Some(anyhow::Error::new(error).context("failed to read review command"));
            }
        };
        let Ok(line) = std::str::from_utf8(&bytes) else {
            eprintln!("ignoring input line that is not valid UTF-8");
            continue;
        };
        if line.trim().is_empty() {
            continue;
        }

        let command = match line.parse::<ReviewCommand>() {
            Ok(ReviewCommand::Quit) => break None,
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };
        if let Err(error) = run_command(controller, command, config, flags).await {
            break Some(error);
        }
    };

    if let Some(error) = &interrupted {
        tracing::warn!(error = %error, "review input interrupted; saving before exit");
    }
    finish(controller, flags).await?;
    interrupted.map_or(Ok(()), Err)
}

fn build_queue(args: &ReviewArgs) -> anyhow::Result<ReviewQueue> {
    let mut entries = args.identifiers.clone();
    if let Some(path) = &args.queue_file {
        let from_file = ReviewQueue::from_file(path)
            .with_context(|| format!("failed to read queue file {}", path.display()))?;
        entries.extend(from_file.entries().map(str::to_string));
    }
    tracing::debug!(entries = entries.len(), "review queue built");
    Ok(ReviewQueue::new(entries))
}

async fn run_command<B: Backend>(
    controller: &mut Controller<B, ReviewQueue>,
    command: ReviewCommand,
    config: &CpvConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let outcome = match command {
        ReviewCommand::Next => controller.next().await,
        ReviewCommand::Previous => controller.previous().await,
        ReviewCommand::Goto(index) => controller.request_index(index).await,
        ReviewCommand::Open(identifier) => controller.request(&identifier).await,
        ReviewCommand::Flag(flag) => controller.set_variability(flag),
        ReviewCommand::Select { method, slot } => controller.select_candidate(method, slot),
        ReviewCommand::Period(period) => controller.set_period(period),
        ReviewCommand::Epoch(epoch) => controller.set_epoch(epoch),
        ReviewCommand::VarTags(tags) => controller.set_vartags(&tags),
        ReviewCommand::ObjectTags(tags) => controller.set_objecttags(&tags),
        ReviewCommand::Comment(text) => controller.set_comments(&text),
        ReviewCommand::Save => controller.save().await,
        ReviewCommand::Panels => {
            // Rebuilt from the store so a reconfigured priority is honored.
            let layout = controller.store().checkplot().map(|cp| {
                build_panels(
                    cp,
                    controller.store().best(),
                    &config.review.method_priority,
                    &config.review.image_mime,
                )
            });
            return match layout {
                Some(layout) => output(&panel_rows(&layout), flags.format),
                None => {
                    eprintln!("no checkplot loaded");
                    Ok(())
                }
            };
        }
        ReviewCommand::Status => return output(&StatusView::new(controller), flags.format),
        ReviewCommand::Queue => return output(&queue_rows(controller), flags.format),
        ReviewCommand::Help => {
            println!("{HELP}");
            return Ok(());
        }
        ReviewCommand::Quit => return Ok(()),
    };

    report(controller, &outcome, flags)
}

/// Print queued notices, then whatever the outcome calls for.
fn report<B: Backend>(
    controller: &mut Controller<B, ReviewQueue>,
    outcome: &Outcome,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    for notice in controller.take_notices() {
        match notice.level {
            NoticeLevel::Info if flags.quiet => {}
            NoticeLevel::Info => eprintln!("{}", notice.message),
            NoticeLevel::Warning => eprintln!("warning: {}", notice.message),
            NoticeLevel::Error => eprintln!("error: {}", notice.message),
        }
    }

    match outcome {
        Outcome::Loaded { .. } => output(&StatusView::new(controller), flags.format),
        Outcome::Skipped(reason) if flags.verbose => {
            eprintln!("nothing to do: {reason}");
            Ok(())
        }
        Outcome::Saved { .. } | Outcome::Edited { .. } | Outcome::Skipped(_) | Outcome::Failed(_) => {
            Ok(())
        }
    }
}

/// Save before exit. A rejected final save is an error so the shell sees a
/// non-zero status.
async fn finish<B: Backend>(
    controller: &mut Controller<B, ReviewQueue>,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let outcome = controller.close().await;
    report(controller, &outcome, flags)?;

    if let Outcome::Failed(error) = outcome {
        return Err(anyhow::Error::new(error))
            .context("the current checkplot was not saved before exit");
    }

    if !flags.quiet {
        eprintln!(
            "{} update(s) accepted this session",
            controller.updates().len()
        );
    }
    Ok(())
}
