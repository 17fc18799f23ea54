/// Placeholder replaced by the user's text in a prompt template
pub const INPUT_PLACEHOLDER: &str = "{input}";

/// Wrap user text in the conversational template, e.g. `User: {input}\nBot:`
pub fn render_prompt(template: &str, input: &str) -> String {
    template.replace(INPUT_PLACEHOLDER, input)
}

/// Turn raw generated text into a display reply.
///
/// Drops an echoed prompt prefix, removes the first occurrence of the reply
/// marker (a leading role label such as `Bot:`), and trims whitespace. May
/// return an empty string when the model produced nothing else.
pub fn clean_reply(generated: &str, prompt: &str, marker: &str) -> String {
    let without_echo = generated.strip_prefix(prompt).unwrap_or(generated);
    let without_marker =
        if marker.is_empty() { without_echo.to_string() } else { without_echo.replacen(marker, "", 1) };
    without_marker.trim().to_string()
}
