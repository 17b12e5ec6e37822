use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use stackchat_core::UserUpdate;

use super::{check_format, prompt_line};
use crate::config::CliContext;

#[derive(Subcommand)]
pub enum AccountCommand {
    #[command(about = "Show the account details")]
    Show {
        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Change name or email; omitted fields keep their value")]
    Update {
        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,
    },

    #[command(about = "Delete the account and end the session")]
    Delete {
        #[arg(short, long, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

pub async fn handle_account_command(ctx: &CliContext, action: Option<AccountCommand>) -> Result<()> {
    match action.unwrap_or(AccountCommand::Show {
        format: "text".to_string(),
    }) {
        AccountCommand::Show { format } => cmd_account_show(ctx, &format).await,
        AccountCommand::Update {
            first_name,
            last_name,
            email,
        } => cmd_account_update(ctx, first_name, last_name, email).await,
        AccountCommand::Delete { yes } => cmd_account_delete(ctx, yes).await,
    }
}

async fn cmd_account_show(ctx: &CliContext, format: &str) -> Result<()> {
    check_format(format)?;
    let user = ctx.client.read_user().await?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&user)?);
        return Ok(());
    }

    println!("{}", "Account".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!("  {:<12} {}", "Name:".bold(), user.full_name());
    println!("  {:<12} {}", "Email:".bold(), user.email);
    if let Some(id) = user.id {
        println!("  {:<12} {}", "Id:".bold(), id.to_string().dimmed());
    }
    Ok(())
}

async fn cmd_account_update(
    ctx: &CliContext,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
) -> Result<()> {
    if first_name.is_none() && last_name.is_none() && email.is_none() {
        println!(
            "{}",
            "Nothing to update. Pass --first-name, --last-name or --email.".yellow()
        );
        return Ok(());
    }

    let current = ctx.client.read_user().await?;
    let mut update = UserUpdate::from(&current);
    if let Some(v) = first_name {
        update.first_name = v;
    }
    if let Some(v) = last_name {
        update.last_name = v;
    }
    if let Some(v) = email {
        update.email = v;
    }

    let message = ctx.client.update_user(&update).await?;
    println!("{} {}", "✓".green().bold(), message.green());
    Ok(())
}

async fn cmd_account_delete(ctx: &CliContext, yes: bool) -> Result<()> {
    if !yes {
        let answer = prompt_line(&format!(
            "{} This permanently deletes your account. Type 'delete' to confirm",
            "!".yellow()
        ))?;
        if answer != "delete" {
            println!("{}", "Cancelled.".dimmed());
            return Ok(());
        }
    }

    ctx.client.delete_user().await?;
    println!("{} Account deleted", "✓".green().bold());
    Ok(())
}
