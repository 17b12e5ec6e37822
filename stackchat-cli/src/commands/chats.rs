use anyhow::Result;
use chrono::Utc;
use clap::Subcommand;
use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};
use stackchat_core::{group_chats_by_date, Chat, ChatGroup};

use super::{check_format, format_datetime, truncate};
use crate::config::CliContext;

#[derive(Subcommand)]
pub enum ChatsCommand {
    #[command(about = "List chats grouped by age")]
    List {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Create a new chat")]
    Create {
        #[arg(help = "Chat name", num_args = 1.., trailing_var_arg = true)]
        name: Vec<String>,
    },

    #[command(about = "Delete a chat and its messages")]
    Delete {
        #[arg(help = "Chat id")]
        id: i64,
    },
}

pub async fn handle_chats_command(ctx: &CliContext, action: Option<ChatsCommand>) -> Result<()> {
    match action.unwrap_or(ChatsCommand::List {
        format: "text".to_string(),
    }) {
        ChatsCommand::List { format } => cmd_chats_list(ctx, &format).await,
        ChatsCommand::Create { name } => cmd_chats_create(ctx, &name.join(" ")).await,
        ChatsCommand::Delete { id } => cmd_chats_delete(ctx, id).await,
    }
}

async fn cmd_chats_list(ctx: &CliContext, format: &str) -> Result<()> {
    check_format(format)?;
    let chats = ctx.client.list_chats().await?;
    let groups = group_chats_by_date(&chats, Utc::now());

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&groups)?);
        return Ok(());
    }

    if groups.is_empty() {
        println!("{}", "No chats yet.".yellow());
        println!(
            "{}",
            "Run 'stackchat chats create <name>' to start one.".dimmed()
        );
        return Ok(());
    }

    for (group, chats) in groups.non_empty() {
        println!("{}", group_heading(group));
        println!("{}", chats_table(chats, ctx.datetime_format()));
        println!();
    }

    println!("{} {} chats", "Total:".dimmed(), groups.len());
    Ok(())
}

fn group_heading(group: ChatGroup) -> colored::ColoredString {
    match group {
        ChatGroup::Today => group.title().cyan().bold(),
        ChatGroup::Yesterday => group.title().blue().bold(),
        ChatGroup::Last7Days => group.title().magenta().bold(),
        ChatGroup::Older => group.title().dimmed().bold(),
    }
}

fn chats_table(chats: &[Chat], datetime_format: &str) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new("Id").fg(Color::White),
            Cell::new("Name").fg(Color::White),
            Cell::new("Created").fg(Color::White),
        ]);

    for chat in chats {
        table.add_row(vec![
            Cell::new(chat.id).fg(Color::DarkGrey),
            Cell::new(truncate(&chat.chat_name, 48)),
            Cell::new(format_datetime(&chat.created_at, datetime_format)),
        ]);
    }

    table
}

async fn cmd_chats_create(ctx: &CliContext, name: &str) -> Result<()> {
    let chat = ctx.client.create_chat(name).await?;
    println!(
        "{} Created chat {} {}",
        "✓".green().bold(),
        chat.chat_name.cyan(),
        format!("(id {})", chat.id).dimmed()
    );
    println!(
        "  {} Ask with {}",
        "→".blue(),
        format!("stackchat ask {} <question>", chat.id).cyan()
    );
    Ok(())
}

async fn cmd_chats_delete(ctx: &CliContext, id: i64) -> Result<()> {
    if ctx.client.delete_chat(id).await? {
        println!("{} Deleted chat {}", "✓".green().bold(), id);
    } else {
        println!("{} Chat {} does not exist", "!".yellow(), id);
    }
    Ok(())
}
