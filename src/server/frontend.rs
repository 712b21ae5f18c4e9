//! Embedded chat page served for every path the API does not claim.
//!
//! The page keeps the conversation in browser memory only. It mirrors the
//! terminal session in `ui::session`: the same greeting, the same
//! submit guard, the same error bubble.

use crate::ui::session::greeting;

const INDEX_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>__TITLE__ AI Chat</title>
<style>
* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: #242424;
  color: #fbf0df;
  font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  min-height: 100vh;
}
.app { max-width: 56rem; margin: 0 auto; padding: 2rem 0.5rem; }
.chat { background: #1a1a1a; border: 2px solid #fbf0df; border-radius: 0.75rem; overflow: hidden; }
.chat-header {
  background: #fbf0df; color: #1a1a1a; padding: 0.75rem 1rem;
  display: flex; justify-content: space-between; align-items: center;
}
.chat-header h2 { font-size: 1.125rem; font-weight: 700; }
.chat-header button {
  background: #1a1a1a; color: #fbf0df; border: none; border-radius: 0.25rem;
  padding: 0.25rem 0.75rem; font-size: 0.875rem; cursor: pointer;
}
.chat-header button:hover { background: #333; }
.messages { height: 24rem; overflow-y: auto; overflow-x: hidden; padding: 1rem; display: flex; flex-direction: column; gap: 1rem; }
.row { display: flex; }
.row.user { justify-content: flex-end; }
.row.assistant { justify-content: flex-start; }
.bubble { max-width: 80%; border-radius: 0.5rem; padding: 0.5rem 1rem; }
.row.user .bubble { background: #fbf0df; color: #1a1a1a; }
.row.assistant .bubble { background: #333; color: #fbf0df; }
.sender { font-size: 0.875rem; font-weight: 500; margin-bottom: 0.25rem; }
.content { white-space: pre-wrap; word-break: break-word; }
.time { font-size: 0.75rem; opacity: 0.7; margin-top: 0.25rem; }
.thinking { display: flex; align-items: center; gap: 0.5rem; }
.spinner {
  width: 1rem; height: 1rem; border-radius: 50%;
  border-bottom: 2px solid #fbf0df; animation: spin 1s linear infinite;
}
@keyframes spin { to { transform: rotate(360deg); } }
form { padding: 1rem; border-top: 1px solid #333; display: flex; gap: 0.5rem; }
form input {
  flex: 1; background: #333; color: #fbf0df; border: 1px solid #555;
  border-radius: 0.5rem; padding: 0.5rem 0.75rem; font-size: 1rem; outline: none;
}
form input:focus { border-color: #fbf0df; }
form input::placeholder { color: rgba(251, 240, 223, 0.5); }
form button {
  background: #fbf0df; color: #1a1a1a; border: none; border-radius: 0.5rem;
  padding: 0.5rem 1rem; font-weight: 500; cursor: pointer; white-space: nowrap;
}
form button:hover { background: #f3d5a3; }
form button:disabled { opacity: 0.5; cursor: not-allowed; }
</style>
</head>
<body>
<div class="app">
  <div class="chat">
    <div class="chat-header">
      <h2>__TITLE__ AI Chat</h2>
      <button id="clear" type="button">Clear Chat</button>
    </div>
    <div class="messages" id="messages"></div>
    <form id="composer">
      <input id="input" type="text" placeholder="Type your message here..." autocomplete="off">
      <button id="send" type="submit" disabled>Send</button>
    </form>
  </div>
</div>
<script>
const ASSISTANT = __ASSISTANT_JSON__;
const GREETING = __GREETING_JSON__;
const DEV_MODE = __DEV_MODE__;
const CHAT_ROUTE = "/api/claude-chat";

const list = document.getElementById("messages");
const input = document.getElementById("input");
const send = document.getElementById("send");

let messages = [];
let isLoading = false;

function newId() {
  return (crypto.randomUUID && crypto.randomUUID()) || String(Date.now() + Math.random());
}

function makeMessage(role, content) {
  return { id: newId(), content, role, timestamp: new Date() };
}

function reportError(text) {
  console.error(text);
  if (!DEV_MODE) return;
  fetch("/api/client-log", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify({ level: "error", message: String(text) }),
  }).catch(() => {});
}

function bubble(role, sender) {
  const row = document.createElement("div");
  row.className = "row " + role;
  const box = document.createElement("div");
  box.className = "bubble";
  const who = document.createElement("div");
  who.className = "sender";
  who.textContent = sender;
  box.appendChild(who);
  row.appendChild(box);
  return [row, box];
}

function render() {
  list.replaceChildren();
  for (const m of messages) {
    const [row, box] = bubble(m.role, m.role === "user" ? "You" : ASSISTANT);
    const body = document.createElement("div");
    body.className = "content";
    body.textContent = m.content;
    const time = document.createElement("div");
    time.className = "time";
    time.textContent = m.timestamp.toLocaleTimeString();
    box.append(body, time);
    list.appendChild(row);
  }
  if (isLoading) {
    const [row, box] = bubble("assistant", ASSISTANT);
    const t = document.createElement("div");
    t.className = "thinking";
    t.innerHTML = '<div class="spinner"></div><span>Thinking...</span>';
    box.appendChild(t);
    list.appendChild(row);
  }
  input.disabled = isLoading;
  send.disabled = !input.value.trim() || isLoading;
  list.lastElementChild && list.lastElementChild.scrollIntoView({ behavior: "smooth" });
}

function clearChat() {
  messages = [makeMessage("assistant", GREETING)];
  render();
}

async function submit(event) {
  event.preventDefault();
  const text = input.value.trim();
  if (!text || isLoading) return;

  const history = messages;
  messages = [...messages, makeMessage("user", text)];
  input.value = "";
  isLoading = true;
  render();

  try {
    const response = await fetch(CHAT_ROUTE, {
      method: "POST",
      headers: { "Content-Type": "application/json" },
      body: JSON.stringify({ message: text, conversationHistory: history }),
    });
    if (!response.ok) {
      throw new Error(`HTTP error! status: ${response.status}`);
    }
    const data = await response.json();
    messages = [...messages, makeMessage("assistant", data.response)];
  } catch (error) {
    reportError("Error sending message: " + (error instanceof Error ? error.message : error));
    const detail = error instanceof Error ? error.message : "Unknown error";
    messages = [...messages, makeMessage("assistant", `Sorry, I encountered an error: ${detail}`)];
  } finally {
    isLoading = false;
    render();
  }
}

document.getElementById("composer").addEventListener("submit", submit);
document.getElementById("clear").addEventListener("click", clearChat);
input.addEventListener("input", () => { send.disabled = !input.value.trim() || isLoading; });
clearChat();
</script>
</body>
</html>
"##;

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// JSON string literal that is also safe inside a `<script>` element.
fn script_literal(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string().replace('<', "\\u003c")
}

fn next_placeholder<'a>(rest: &str, values: &[(&'a str, &'a str)]) -> Option<(usize, &'a str, &'a str)> {
    values
        .iter()
        .filter_map(|&(key, value)| rest.find(key).map(|pos| (pos, key, value)))
        .min_by_key(|&(pos, _, _)| pos)
}

/// Substitutes every placeholder in a single left-to-right pass; inserted
/// values are never scanned again.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some((pos, key, value)) = next_placeholder(rest, values) {
        out.push_str(&rest[..pos]);
        out.push_str(value);
        rest = &rest[pos + key.len()..];
    }
    out.push_str(rest);
    out
}

pub fn render_index(assistant_name: &str, dev_mode: bool) -> String {
    let title = escape_html(assistant_name);
    let assistant_json = script_literal(assistant_name);
    let greeting_json = script_literal(&greeting(assistant_name));
    fill(
        INDEX_TEMPLATE,
        &[
            ("__TITLE__", title.as_str()),
            ("__ASSISTANT_JSON__", assistant_json.as_str()),
            ("__GREETING_JSON__", greeting_json.as_str()),
            ("__DEV_MODE__", if dev_mode { "true" } else { "false" }),
        ]
    )
}
