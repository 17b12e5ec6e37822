use anyhow::Result;
use colored::Colorize;
use stackchat_core::{LoginField, NewUser};

use super::{prompt_password, value_or_prompt};
use crate::config::CliContext;

pub async fn handle_login(
    ctx: &CliContext,
    identifier: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let label = match ctx.config.api.login_field {
        LoginField::Email => "Email",
        LoginField::Username => "Username",
    };
    let identifier = value_or_prompt(identifier, label)?;
    let password = match password {
        Some(p) => p,
        None => prompt_password("Password")?,
    };

    ctx.client.login(&identifier, &password).await?;

    println!(
        "{} Logged in as {}",
        "✓".green().bold(),
        identifier.cyan()
    );
    if let Some(path) = &ctx.session_path {
        println!("  {} Session saved to {}", "→".blue(), path.display());
    }
    Ok(())
}

pub async fn handle_logout(ctx: &CliContext) -> Result<()> {
    if !ctx.client.is_authenticated().await {
        println!("{}", "Not logged in.".yellow());
        return Ok(());
    }

    ctx.client.logout().await?;
    println!("{} Logged out", "✓".green().bold());
    Ok(())
}

pub async fn handle_signup(
    ctx: &CliContext,
    first_name: Option<String>,
    last_name: Option<String>,
    email: Option<String>,
    password: Option<String>,
) -> Result<()> {
    let first_name = value_or_prompt(first_name, "First name")?;
    let last_name = value_or_prompt(last_name, "Last name")?;
    let email = value_or_prompt(email, "Email")?;
    let password = match password {
        Some(p) => p,
        None => {
            let first = prompt_password("Password")?;
            let again = prompt_password("Password (again)")?;
            if first != again {
                anyhow::bail!("Passwords don't match");
            }
            first
        }
    };

    let user = NewUser::new(first_name, last_name, email, password);
    let message = ctx.client.sign_up(&user).await?;

    println!("{} {}", "✓".green().bold(), message.green());
    println!(
        "  {} Run {} to continue",
        "→".blue(),
        "stackchat login".cyan()
    );
    Ok(())
}

pub async fn handle_refresh(ctx: &CliContext) -> Result<()> {
    ctx.client.refresh_access_token().await?;
    println!("{} Access token refreshed", "✓".green().bold());
    Ok(())
}
