use clap::Parser;
use dotenv::dotenv;
use gpt_relay_chat::cli::{ Args, Command };
use std::error::Error;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    dotenv().ok();
    let args = Args::parse();

    // Keep the terminal client's transcript readable.
    let default_filter = match args.command {
        Some(Command::Chat { .. }) => "warn",
        _ => args.mode.default_log_filter(),
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    gpt_relay_chat::run(args).await
}
