use anyhow::Result;
use colored::Colorize;
use stackchat_core::{send_message, Message, PendingReply, Reference, SendStage, Transcript};

use super::{check_format, format_datetime, truncate};
use crate::config::CliContext;

const SNIPPET_CHARS: usize = 160;

pub async fn handle_messages(ctx: &CliContext, chat_id: i64, format: &str) -> Result<()> {
    check_format(format)?;
    let messages = ctx.client.list_messages(chat_id).await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&messages)?);
        return Ok(());
    }

    if messages.is_empty() {
        println!("{}", "No messages in this chat yet.".yellow());
        return Ok(());
    }

    for message in &messages {
        print_message(message, ctx.datetime_format());
    }
    Ok(())
}

pub async fn handle_ask(ctx: &CliContext, chat_id: i64, prompt: &str) -> Result<()> {
    let history = ctx.client.list_messages(chat_id).await?;
    let mut transcript = Transcript::with_messages(chat_id, history);

    send_message(ctx.client.as_ref(), &mut transcript, prompt, |stage, _| {
        if stage == SendStage::Thinking {
            println!("{}", PendingReply::LABEL.dimmed().italic());
        }
    })
    .await?;

    match transcript.last_bot_message() {
        Some(answer) => {
            println!();
            println!("{}", answer.display_text());
            print_references(&answer.references());
        }
        None => println!("{}", "The backend returned no answer.".yellow()),
    }
    Ok(())
}

fn print_message(message: &Message, datetime_format: &str) {
    let when = format_datetime(&message.created_at, datetime_format);
    if message.is_user {
        println!("{} {}", "You".cyan().bold(), when.dimmed());
    } else {
        println!("{} {}", "Bot".magenta().bold(), when.dimmed());
    }
    println!("{}", message.display_text());
    print_references(&message.references());
    println!();
}

fn print_references(references: &[Reference]) {
    if references.is_empty() {
        return;
    }

    println!();
    println!("  {}", "References".yellow().bold());
    for (i, reference) in references.iter().enumerate() {
        println!(
            "  {} {} {}",
            format!("[{}]", i + 1).dimmed(),
            reference.score_percent().green(),
            truncate(&reference.content.replace('\n', " "), SNIPPET_CHARS)
        );
    }
}
