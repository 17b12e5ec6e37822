#![allow(
    dead_code,
    unused_imports,
    unused_variables,
    unused_mut,
    clippy::too_many_arguments,
    clippy::needless_borrows_for_generic_args,
    clippy::useless_format,
    clippy::len_zero,
    clippy::field_reassign_with_default
)]

use clap::{Parser, Subcommand};
use colored::Colorize;
use stackchat_core::{init_logging, CliErrorDisplay, LogTarget, StackchatError};
use std::process::ExitCode;

mod commands;
mod config;

use commands::{
    handle_account_command, handle_ask, handle_chats_command, handle_login, handle_logout,
    handle_messages, handle_refresh, handle_signup, handle_status, handle_train_command,
    AccountCommand, ChatsCommand, TrainCommand,
};
use config::CliContext;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

#[derive(Parser)]
#[command(name = "stackchat")]
#[command(author = "Stackchat Contributors")]
#[command(version = VERSION)]
#[command(about = "Stackchat - chat with the Stack Exchange answer service")]
#[command(long_about = r#"
Stackchat talks to the question-answering backend: sign up, log in, build the
answer index, then open chats and ask questions. Answers come with the
Stack Exchange snippets they were generated from.

Run 'stackchat login' first, then 'stackchat train start --watch' once per
backend, and 'stackchat chats create <name>' to start asking.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[arg(long, global = true, help = "Backend base URL (overrides configuration)")]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(about = "Log in and store the session tokens")]
    Login {
        #[arg(short, long, help = "Email (or username, depending on api.login_field)")]
        email: Option<String>,

        #[arg(short, long, help = "Password; prompted for when omitted")]
        password: Option<String>,
    },

    #[command(about = "Log out and forget the stored tokens")]
    Logout,

    #[command(about = "Create a new account")]
    Signup {
        #[arg(long)]
        first_name: Option<String>,

        #[arg(long)]
        last_name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long, help = "Password; prompted for when omitted")]
        password: Option<String>,
    },

    #[command(about = "Exchange the refresh token for a new access token")]
    Refresh,

    #[command(about = "Show, update or delete your account")]
    Account {
        #[command(subcommand)]
        action: Option<AccountCommand>,
    },

    #[command(about = "List, create and delete chats")]
    Chats {
        #[command(subcommand)]
        action: Option<ChatsCommand>,
    },

    #[command(about = "Show the transcript of a chat")]
    Messages {
        #[arg(help = "Chat id")]
        chat_id: i64,

        #[arg(
            short,
            long,
            default_value = "text",
            help = "Output format (text, json)"
        )]
        format: String,
    },

    #[command(about = "Ask a question in a chat and print the answer")]
    Ask {
        #[arg(help = "Chat id")]
        chat_id: i64,

        #[arg(help = "Question text", num_args = 1.., trailing_var_arg = true)]
        prompt: Vec<String>,
    },

    #[command(about = "Build the answer index and follow its progress")]
    Train {
        #[command(subcommand)]
        action: Option<TrainCommand>,
    },

    #[command(about = "Show session and configuration summary")]
    Status {
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    #[command(about = "Show version information")]
    Version {
        #[arg(short, long)]
        detailed: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let ctx = match CliContext::load(cli.api_url.as_deref()) {
        Ok(ctx) => ctx,
        Err(e) => {
            print_error(&e);
            return ExitCode::FAILURE;
        }
    };

    if !ctx.config.display.color {
        colored::control::set_override(false);
    }

    let requested = cli.verbose.then_some("debug");
    if let Err(e) = init_logging(&ctx.config.logging, requested, "warn", LogTarget::Stderr) {
        eprintln!("{}: {}", "Warning".yellow().bold(), e);
    }

    match run(cli, ctx).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn print_error(e: &anyhow::Error) {
    match e.downcast_ref::<StackchatError>() {
        Some(err) => eprint!("{}: {}", "Error".red().bold(), CliErrorDisplay::new(err)),
        None => eprintln!("{}: {}", "Error".red().bold(), e),
    }
}

async fn run(cli: Cli, ctx: CliContext) -> anyhow::Result<()> {
    match cli.command {
        Commands::Login { email, password } => handle_login(&ctx, email, password).await,
        Commands::Logout => handle_logout(&ctx).await,
        Commands::Signup {
            first_name,
            last_name,
            email,
            password,
        } => handle_signup(&ctx, first_name, last_name, email, password).await,
        Commands::Refresh => handle_refresh(&ctx).await,
        Commands::Account { action } => handle_account_command(&ctx, action).await,
        Commands::Chats { action } => handle_chats_command(&ctx, action).await,
        Commands::Messages { chat_id, format } => handle_messages(&ctx, chat_id, &format).await,
        Commands::Ask { chat_id, prompt } => handle_ask(&ctx, chat_id, &prompt.join(" ")).await,
        Commands::Train { action } => handle_train_command(&ctx, action).await,
        Commands::Status { format } => handle_status(&ctx, &format).await,
        Commands::Version { detailed } => cmd_version(detailed),
    }
}

fn cmd_version(detailed: bool) -> anyhow::Result<()> {
    if detailed {
        println!("{}", "Stackchat Version Information".cyan().bold());
        println!("{}", "═".repeat(40).dimmed());
        println!("  {:<15} {}", "Version:".bold(), VERSION);
        println!("  {:<15} {}", "Name:".bold(), NAME);
        println!("  {:<15} Apache-2.0", "License:".bold());
        println!();
        println!("  {}", "Build Information:".bold());
        println!("    Rust Edition: 2021");
        #[cfg(debug_assertions)]
        println!("    Build:        Debug");
        #[cfg(not(debug_assertions))]
        println!("    Build:        Release");
    } else {
        println!("stackchat {}", VERSION);
    }

    Ok(())
}
