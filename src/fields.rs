use serde_json::Value;

const AFFIRMATIVE_TOKENS: [&str; 3] = ["sim", "true", "1"];
const SUSPENDED_TOKEN: &str = "suspenso";
const DASH_PLACEHOLDER: &str = "-";

// Lower-case substrings meaning "not started yet". "sem previs" covers both
// spellings of "sem previsão".
const NO_START_PHRASES: [&str; 4] = [
    "sem start real",
    "sem previs",
    "no actual start",
    "no forecast",
];

/// Absent and null become empty; other scalars are stringified. Always trimmed.
pub fn normalize_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

pub fn is_affirmative(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    AFFIRMATIVE_TOKENS.contains(&lowered.as_str())
}

pub fn is_suspended_marker(text: &str) -> bool {
    text.trim().to_lowercase() == SUSPENDED_TOKEN
}

pub fn is_no_start_text(text: &str) -> bool {
    let lowered = text.trim().to_lowercase();
    lowered.is_empty()
        || lowered == DASH_PLACEHOLDER
        || NO_START_PHRASES
            .iter()
            .any(|phrase| lowered.contains(phrase))
}
