use clap::{ Parser, Subcommand, ValueEnum };
use std::fmt;

use crate::llm::{ LlmConfig, LlmType, ParseLlmTypeError };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    // --- Server Args ---
    /// Port for the HTTP server.
    #[arg(long, env = "PORT", default_value = "3000", global = true)]
    pub port: u16,

    /// Interface the HTTP server binds to.
    #[arg(long, env = "HOST", default_value = "0.0.0.0", global = true)]
    pub host: String,

    /// Runtime mode. Development raises the default log level and echoes
    /// browser console errors into the server log.
    #[arg(long, env = "APP_ENV", value_enum, default_value = "development", global = true)]
    pub mode: RunMode,

    // --- Chat LLM Provider Args ---
    /// Type of LLM provider for chat completion (openrouter, openai, ollama)
    #[arg(long, env = "CHAT_LLM_TYPE", default_value = "openrouter", global = true)]
    pub chat_llm_type: String,

    /// API Key for the Chat LLM provider
    #[arg(long, env = "OPENROUTER_API_KEY", default_value = "", hide_env_values = true, global = true)]
    pub chat_api_key: String,

    /// Model name for chat completion (e.g., openai/gpt-5, gpt-4o, llama3)
    #[arg(long, env = "CHAT_MODEL", global = true)] // No default, rely on adapter defaults if None
    pub chat_model: Option<String>,

    /// Base URL for the Chat LLM provider API
    #[arg(long, env = "CHAT_BASE_URL", global = true)] // No default, let adapters handle defaults if None
    pub chat_base_url: Option<String>,

    /// Name shown on assistant messages and in the greeting.
    #[arg(long, env = "ASSISTANT_NAME", default_value = "GPT-5", global = true)]
    pub assistant_name: String,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Run the chat web server (default).
    Serve,
    /// Chat with a running server from the terminal.
    Chat {
        /// Base URL of the chat server.
        #[arg(long, env = "CHAT_SERVER_URL", default_value = "http://127.0.0.1:3000")]
        server_url: String,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    Development,
    Production,
}

impl RunMode {
    pub fn is_development(&self) -> bool {
        matches!(self, RunMode::Development)
    }

    pub fn default_log_filter(&self) -> &'static str {
        match self {
            RunMode::Development => "debug",
            RunMode::Production => "info",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunMode::Development => write!(f, "development"),
            RunMode::Production => write!(f, "production"),
        }
    }
}

impl Args {
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn chat_llm_config(&self) -> Result<LlmConfig, ParseLlmTypeError> {
        let llm_type: LlmType = self.chat_llm_type.parse()?;
        Ok(LlmConfig {
            llm_type,
            api_key: Some(self.chat_api_key.clone()).filter(|k| !k.is_empty()),
            completion_model: self.chat_model.clone(),
            base_url: self.chat_base_url.clone(),
        })
    }
}
