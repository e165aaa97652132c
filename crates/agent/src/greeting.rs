//! Greeting short-circuit: a bare greeting gets a canned reply without
//! touching the index or the model.

pub const GREETINGS: &[&str] = &["hi", "hello", "hey", "gday", "good morning", "good afternoon"];

pub const GREETING_RESPONSE: &str =
    "Hey there! You can ask me anything about my experience, skills, or projects.";

pub const GREETING_THINKING: &str = "User said hello, I'll greet them back.";

/// True when the trimmed, lower-cased query is exactly one of [`GREETINGS`].
pub fn is_greeting(query: &str) -> bool {
    let normalized = query.trim().to_lowercase();
    GREETINGS.contains(&normalized.as_str())
}
