use std::error::Error;
use tokio::io::{ AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader };
use log::info;

use super::backend::{ ChatBackend, HttpChatBackend };
use super::session::ChatSession;

const HELP: &str = "Type a message and press Enter. /clear resets the chat, /quit exits.\n\n";

enum Input {
    Message(String),
    Clear,
    Quit,
}

fn parse_line(line: &str) -> Input {
    match line.trim() {
        "/clear" => Input::Clear,
        "/quit" | "/exit" => Input::Quit,
        _ => Input::Message(line.to_string()),
    }
}

/// Line-oriented chat against a running server on stdin/stdout.
pub async fn run(server_url: &str, assistant_name: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let backend = HttpChatBackend::new(server_url);
    info!("Chatting via {}", backend.endpoint());
    let stdin = BufReader::new(tokio::io::stdin());
    let stdout = tokio::io::stdout();
    run_with(&backend, assistant_name, stdin, stdout).await
}

pub async fn run_with<B, R, W>(
    backend: &B,
    assistant_name: &str,
    reader: R,
    mut writer: W
) -> Result<(), Box<dyn Error + Send + Sync>>
    where B: ChatBackend + ?Sized, R: AsyncBufRead + Unpin, W: AsyncWrite + Unpin
{
    let mut session = ChatSession::new(assistant_name);
    writer.write_all(HELP.as_bytes()).await?;
    writer.write_all(session.render_new().as_bytes()).await?;
    writer.flush().await?;

    let mut lines = reader.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_line(&line) {
            Input::Quit => {
                break;
            }
            Input::Clear => {
                session.clear();
            }
            Input::Message(text) => {
                session.set_draft(text);
                if let Some(request) = session.begin_submit() {
                    writer.write_all(session.render_new().as_bytes()).await?;
                    writer.flush().await?;
                    let result = backend.send(&request).await;
                    session.finish_submit(result);
                }
            }
        }
        writer.write_all(session.render_new().as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}
