use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use stackchat_core::{
    progress_for, PollerSnapshot, PollerState, TrainingMonitor, TrainingPoller, TrainingProgress,
};
use std::io::{self, Write};
use std::sync::Arc;

use super::check_format;
use crate::config::CliContext;

const BAR_WIDTH: usize = 30;

#[derive(Subcommand)]
pub enum TrainCommand {
    #[command(about = "Start building the answer index")]
    Start {
        #[arg(short, long, help = "Follow progress until the task finishes")]
        watch: bool,
    },

    #[command(about = "Show the status of the last training task")]
    Status {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Follow the last training task until it finishes")]
    Watch,
}

pub async fn handle_train_command(ctx: &CliContext, action: Option<TrainCommand>) -> Result<()> {
    match action {
        Some(TrainCommand::Start { watch }) => cmd_train_start(ctx, watch).await,
        Some(TrainCommand::Status { format }) => cmd_train_status(ctx, &format).await,
        Some(TrainCommand::Watch) => cmd_train_watch(ctx).await,
        None => cmd_train_status(ctx, "text").await,
    }
}

async fn cmd_train_start(ctx: &CliContext, watch: bool) -> Result<()> {
    println!("{}", "Starting index build...".cyan().bold());

    if !ctx.client.train_model().await? {
        println!(
            "{} The backend did not start a task; the index may already exist.",
            "!".yellow()
        );
        return Ok(());
    }

    let task_id = ctx.client.session().await.task_id;
    println!(
        "{} Training started {}",
        "✓".green().bold(),
        task_id
            .map(|id| format!("(task {})", id))
            .unwrap_or_default()
            .dimmed()
    );

    if watch {
        println!();
        cmd_train_watch(ctx).await
    } else {
        println!(
            "  {} Follow it with {}",
            "→".blue(),
            "stackchat train watch".cyan()
        );
        Ok(())
    }
}

async fn cmd_train_status(ctx: &CliContext, format: &str) -> Result<()> {
    check_format(format)?;
    let status = ctx.client.monitor_training().await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    let mut progress = TrainingProgress::default();
    progress.apply(&status);

    println!("{}", "Training Status".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    if let Some(task_id) = &status.task_id {
        println!("  {:<10} {}", "Task:".bold(), task_id.dimmed());
    }
    println!("  {:<10} {}", "State:".bold(), status.status);
    println!("  {:<10} {}", "Result:".bold(), progress.status_text);
    println!("  {:<10} {}", "Progress:".bold(), progress_bar(progress.percent));
    if status.result.as_deref().and_then(progress_for).is_none() && status.result.is_some() {
        println!(
            "  {}",
            "Unrecognised stage; progress shows the last known step.".dimmed()
        );
    }
    Ok(())
}

async fn cmd_train_watch(ctx: &CliContext) -> Result<()> {
    // Fail fast on missing credentials instead of inside the poll loop.
    ctx.client.session().await.task_id()?;

    let monitor: Arc<dyn TrainingMonitor> = ctx.client.clone();
    let mut handle = TrainingPoller::new(monitor, ctx.config.poll_interval()).spawn();
    let mut rx = handle.subscribe();

    draw(&rx.borrow().clone());
    loop {
        tokio::select! {
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = rx.borrow_and_update().clone();
                draw(&snapshot);
                if snapshot.state.is_terminal() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                handle.cancel();
            }
        }
    }
    println!();

    let done = handle.snapshot();
    match done.state {
        PollerState::Succeeded => {
            println!(
                "{} {}",
                "✓".green().bold(),
                "Index ready. Start a chat with 'stackchat chats create <name>'.".green()
            );
            Ok(())
        }
        PollerState::Failed => {
            anyhow::bail!("Training failed: {}", done.progress.status_text)
        }
        _ => {
            println!(
                "{} Stopped following the task after {} polls.",
                "!".yellow(),
                done.polls
            );
            Ok(())
        }
    }
}

fn draw(snapshot: &PollerSnapshot) {
    print!(
        "\r\x1b[2K  {} {}",
        progress_bar(snapshot.progress.percent),
        snapshot.progress.status_text.dimmed()
    );
    let _ = io::stdout().flush();
}

pub(crate) fn progress_bar(percent: u8) -> String {
    let percent = percent.min(100) as usize;
    let filled = percent * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        percent
    )
}
