use anyhow::Result;
use colored::Colorize;

use super::check_format;
use crate::config::CliContext;

pub async fn handle_status(ctx: &CliContext, format: &str) -> Result<()> {
    check_format(format)?;
    let session = ctx.client.session().await;
    let session_file = ctx
        .session_path
        .as_ref()
        .map(|p| p.display().to_string());

    if format == "json" {
        let output = serde_json::json!({
            "api_url": ctx.client.base_url(),
            "login_field": ctx.config.api.login_field.as_str(),
            "authenticated": session.is_authenticated(),
            "task_id": session.task_id,
            "session_file": session_file,
            "poll_interval_secs": ctx.config.training.poll_interval_secs,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", "Stackchat Status".cyan().bold());
    println!("{}", "═".repeat(40).dimmed());
    println!();

    println!("  {}", "Backend".yellow().bold());
    println!("    API URL:       {}", ctx.client.base_url());
    println!("    Login field:   {}", ctx.config.api.login_field.as_str());
    match ctx.config.api.request_timeout_secs {
        Some(secs) => println!("    Timeout:       {}s", secs),
        None => println!("    Timeout:       {}", "none".dimmed()),
    }

    println!();
    println!("  {}", "Session".yellow().bold());
    if session.is_authenticated() {
        println!("    Logged in:     {}", "yes".green());
    } else {
        println!("    Logged in:     {}", "no".red());
    }
    match &session.task_id {
        Some(id) => println!("    Training task: {}", id),
        None => println!("    Training task: {}", "none".dimmed()),
    }
    match &session_file {
        Some(path) => println!("    Session file:  {}", path.dimmed()),
        None => println!("    Session file:  {}", "in memory".dimmed()),
    }

    println!();
    println!(
        "  {} poll every {}s",
        "Training:".dimmed(),
        ctx.config.training.poll_interval_secs
    );
    Ok(())
}
