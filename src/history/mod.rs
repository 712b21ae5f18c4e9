use crate::models::chat::HistoryEntry;

/// Number of prior turns carried into the prompt.
pub const HISTORY_FOR_PROMPT_LEN: usize = 5;

/// The most recent `HISTORY_FOR_PROMPT_LEN` entries, oldest dropped first.
pub fn recent_history(history: &[HistoryEntry]) -> &[HistoryEntry] {
    let start = history.len().saturating_sub(HISTORY_FOR_PROMPT_LEN);
    &history[start..]
}

/// Flattens the recent history into `Human: ...` / `Assistant: ...` lines.
pub fn format_history_for_prompt(history: &[HistoryEntry]) -> String {
    recent_history(history)
        .iter()
        .map(|entry| format!("{}: {}", entry.role.transcript_label(), entry.content))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(history: &[HistoryEntry], message: &str) -> String {
    let context = format_history_for_prompt(history);
    if context.is_empty() {
        format!("Human: {}\n\nAssistant:", message)
    } else {
        format!("Previous conversation:\n{}\n\nHuman: {}\n\nAssistant:", context, message)
    }
}
