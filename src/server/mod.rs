pub mod api;
pub mod frontend;

use crate::cli::Args;
use crate::llm::chat::ChatClient;
use log::info;
use std::error::Error;
use std::sync::Arc;

pub struct Server {
    addr: String,
    client: Arc<dyn ChatClient>,
    args: Args,
}

impl Server {
    pub fn new(addr: String, client: Arc<dyn ChatClient>, args: Args) -> Self {
        Self { addr, client, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let state = api::AppState::new(
            self.client.clone(),
            self.args.mode,
            self.args.assistant_name.clone()
        );
        let app = api::router(state);

        let listener = tokio::net::TcpListener::bind(&self.addr).await.map_err(|e|
            format!("Failed to bind HTTP server to {}: {}. Try a different port.", self.addr, e)
        )?;
        info!("Server running at http://{}", self.addr);

        axum::serve(listener, app.into_make_service()).await?;
        Ok(())
    }
}
