use clap::{Parser, Subcommand};

mod api;
mod config;
mod conversation;
mod events;
mod session;
mod ui;

use api::{ChatBackend, ChatClient};
use config::Config;
use conversation::ConversationController;

#[derive(Parser)]
#[command(name = "ripple")]
#[command(version = "0.1.0")]
#[command(about = "Terminal client for the Ripple chat service", long_about = None)]
struct Cli {
    /// Override the configured service base URL
    #[arg(long)]
    service_url: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Probe the chat service and report whether it is reachable
    Health,
    /// Send one message and print the reply, without entering the TUI
    Ask { message: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(url) = cli.service_url {
        config.service_url = url;
    }

    match cli.command {
        None => ui::app::run(&config).await,
        Some(Commands::Health) => {
            let client = ChatClient::new(&config);
            match client.probe_health().await {
                Ok(()) => {
                    println!("✅ {} is reachable", config.service_url);
                    Ok(())
                }
                Err(err) => {
                    println!("❌ {} is unreachable: {err}", config.service_url);
                    std::process::exit(1);
                }
            }
        }
        Some(Commands::Ask { message }) => {
            let client = ChatClient::new(&config);
            let mut controller = ConversationController::new();
            if !controller.send_message(&client, &message).await {
                anyhow::bail!("Nothing to send");
            }
            if let Some(reply) = controller.messages().last() {
                println!("{}", reply.text);
            }
            Ok(())
        }
    }
}
