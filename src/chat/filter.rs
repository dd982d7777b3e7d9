//! Per-turn sanitizing of the history an agent is shown.

use crate::types::{Message, Role};

/// Stand-in for a blank non-system message.
pub const PLACEHOLDER: &str = "continuing…";

/// Prefix for tool output re-wrapped as conversation.
pub const RESULT_PREFIX: &str = "Execution result:\n";

/// Header some tool backends embed in plain text before a function's output.
pub const LEGACY_RESPONSE_MARKER: &str = "***** Response from calling function";

const LEGACY_RULE: &str = "**************************************************";

/// Produce a copy of `history` that is safe to hand to any agent.
///
/// Function-role records are dropped. Tool results become assistant
/// messages carrying only the result text, or vanish when that text is
/// blank. Remaining blank non-system messages get [`PLACEHOLDER`]. Order is
/// preserved and the operation is idempotent.
pub fn filter_history(history: &[Message]) -> Vec<Message> {
    history.iter().filter_map(filter_message).collect()
}

fn filter_message(msg: &Message) -> Option<Message> {
    if msg.role == Role::Function {
        return None;
    }
    if msg.role == Role::System {
        return Some(msg.clone());
    }

    let extracted = if msg.is_function_result() {
        Some(msg.content.trim().to_string())
    } else if msg.content.contains(LEGACY_RESPONSE_MARKER) && !msg.content.starts_with(RESULT_PREFIX) {
        Some(extract_legacy_result(&msg.content))
    } else {
        None
    };

    if let Some(text) = extracted {
        if text.is_empty() {
            return None;
        }
        return Some(Message {
            role: Role::Assistant,
            author: msg.author,
            content: format!("{RESULT_PREFIX}{text}"),
            function_call: None,
            function_result_of: None,
            timestamp: msg.timestamp,
        });
    }

    let mut clean = msg.clone();
    clean.function_call = None;
    if clean.is_blank() {
        clean.content = PLACEHOLDER.to_string();
    }
    Some(clean)
}

/// Lines between the response header and the closing rule, blanks skipped.
fn extract_legacy_result(content: &str) -> String {
    let mut capturing = false;
    let mut lines = Vec::new();
    for line in content.lines() {
        if line.contains(LEGACY_RESPONSE_MARKER) {
            capturing = true;
        } else if line.starts_with(LEGACY_RULE) {
            capturing = false;
        } else if capturing && !line.trim().is_empty() {
            lines.push(line);
        }
    }
    lines.join("\n").trim().to_string()
}
