pub mod cli;
pub mod history;
pub mod llm;
pub mod models;
pub mod server;
pub mod ui;

use cli::{ Args, Command };
use llm::chat::new_client as new_chat_client;
use log::info;
use server::Server;
use std::error::Error;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    match &args.command {
        Some(Command::Chat { server_url }) => {
            return ui::terminal::run(server_url, &args.assistant_name).await;
        }
        Some(Command::Serve) | None => {}
    }

    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr());
    info!("Mode: {}", args.mode);
    info!("Chat LLM Type: {}", args.chat_llm_type);
    info!("Chat API Key: {}", if args.chat_api_key.is_empty() { "not set" } else { "set" });
    info!("Assistant Name: {}", args.assistant_name);
    info!("-------------------------");

    let chat_config = args.chat_llm_config()?;
    let client = new_chat_client(&chat_config)?;
    info!(
        "Chat client configured: Type={}, Model={}, BaseURL={}",
        chat_config.llm_type,
        client.get_model(),
        client.get_base_url().as_deref().unwrap_or("adapter default")
    );

    let server = Server::new(args.server_addr(), client, args.clone());
    server.run().await?;

    Ok(())
}
