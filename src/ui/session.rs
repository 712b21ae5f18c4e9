use crate::models::chat::{ ChatMessage, ChatRequest, ChatResponse, Role };
use crate::ui::backend::{ ChatBackend, ClientError };
use log::{ debug, error };

pub fn greeting(assistant_name: &str) -> String {
    format!("Hello! I'm {}, powered by the AI SDK. How can I help you today?", assistant_name)
}

/// In-memory conversation state for one chat view.
///
/// The sequence always holds at least the greeting and only grows, except
/// for `clear`, which swaps it for a fresh greeting. `is_loading` blocks new
/// submissions while a request is out; it does not cancel or queue anything,
/// and a reply that lands after `clear` is still appended.
pub struct ChatSession {
    assistant_name: String,
    messages: Vec<ChatMessage>,
    draft: String,
    is_loading: bool,
    rendered: usize,
}

impl ChatSession {
    pub fn new(assistant_name: impl Into<String>) -> Self {
        let assistant_name = assistant_name.into();
        let messages = vec![ChatMessage::assistant(greeting(&assistant_name))];
        Self {
            assistant_name,
            messages,
            draft: String::new(),
            is_loading: false,
            rendered: 0,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// First half of a submit: appends the user message and returns the
    /// request to send, or `None` when the draft is blank or a request is
    /// already in flight.
    pub fn begin_submit(&mut self) -> Option<ChatRequest> {
        let content = self.draft.trim();
        if content.is_empty() || self.is_loading {
            return None;
        }

        let request = ChatRequest {
            message: content.to_string(),
            conversation_history: self.messages.clone(),
        };
        self.messages.push(ChatMessage::user(request.message.clone()));
        self.draft.clear();
        self.is_loading = true;
        Some(request)
    }

    /// Second half of a submit: appends the reply, or an apology carrying the
    /// error, and clears the loading flag either way.
    pub fn finish_submit(&mut self, result: Result<ChatResponse, ClientError>) {
        let reply = match result {
            Ok(resp) => ChatMessage::assistant(resp.response),
            Err(e) => {
                error!("Error sending message: {}", e);
                ChatMessage::assistant(format!("Sorry, I encountered an error: {}", e))
            }
        };
        self.messages.push(reply);
        self.is_loading = false;
    }

    /// Runs a whole submit cycle against `backend`. Returns `false` when the
    /// guard rejected the draft and nothing was sent.
    pub async fn submit<B: ChatBackend + ?Sized>(&mut self, backend: &B) -> bool {
        let Some(request) = self.begin_submit() else {
            return false;
        };
        debug!("Sending message with {} history entries", request.conversation_history.len());
        let result = backend.send(&request).await;
        self.finish_submit(result);
        true
    }

    pub fn clear(&mut self) {
        self.messages = vec![ChatMessage::assistant(greeting(&self.assistant_name))];
        self.rendered = 0;
    }

    fn sender_label(&self, role: Role) -> &str {
        match role {
            Role::User => "You",
            Role::Assistant => &self.assistant_name,
        }
    }

    fn render_from(&self, start: usize) -> String {
        let mut out = String::new();
        for msg in &self.messages[start..] {
            out.push_str(
                &format!(
                    "{} [{}]\n{}\n\n",
                    self.sender_label(msg.role),
                    msg.timestamp.format("%H:%M:%S"),
                    msg.content
                )
            );
        }
        if self.is_loading {
            out.push_str(&format!("{}\nThinking...\n\n", self.assistant_name));
        }
        out
    }

    /// Full transcript, oldest first, with a thinking marker while loading.
    pub fn render(&self) -> String {
        self.render_from(0)
    }

    /// Only what was appended since the previous call, so a scrolling
    /// terminal always ends on the newest message.
    pub fn render_new(&mut self) -> String {
        let start = self.rendered.min(self.messages.len());
        let out = self.render_from(start);
        self.rendered = self.messages.len();
        out
    }
}
