//! Prompt assembly for persona completions

/// Build the single-shot completion prompt for one transcript.
///
/// The persona's character description is prepended unchanged, followed by
/// turn markers. No conversation state is carried across invocations.
#[must_use]
pub fn build_prompt(system_prompt: &str, transcript: &str) -> String {
    format!("{system_prompt}\n\nUser: {transcript}\n\nAssistant:")
}
