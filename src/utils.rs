use poise::serenity_prelude::MessageBuilder;

// Custom ID of the persistent button posted by /confessembed
pub const CONFESS_BUTTON_ID: &str = "confess_button";

// Up to three cards share one message, and Discord caps all embeds of a
// message at 6000 characters together, so tags get a small slice of that.
pub const MAX_TAG_FIELD_CHARS: usize = 256;

#[derive(Debug, Clone, poise::Modal)]
#[name = "Whisper Your Secret"]
pub struct ComposeModal {
    #[name = "Confession (min 10 characters, # adds tags)"]
    #[placeholder = "Example: I've been secretly watering my roommate's plant with coffee #roommateprobs"]
    #[paragraph]
    #[max_length = 1000]
    pub content: String,
    #[name = "Secret code (4 to 8 characters)"]
    #[placeholder = "Min 4 digits"]
    #[max_length = 8]
    pub secret_code: String,
}

#[derive(Debug, Clone, poise::Modal)]
#[name = "Search by vibe"]
pub struct SearchModal {
    #[name = "Category starts with"]
    #[placeholder = "e.g. stu, fun (leave empty to clear)"]
    #[max_length = 50]
    pub query: Option<String>,
}

/// Component IDs are `<session>:<action>`, where `action` may carry its own
/// `:`-separated arguments. The session ID ties a press to the panel that
/// rendered it.
pub fn component_id(session: u64, action: &str) -> String {
    format!("{}:{}", session, action)
}

/// Splits a component ID into its session and action. Returns `None` for IDs
/// that were not produced by [`component_id`].
pub fn parse_component_id(custom_id: &str) -> Option<(u64, &str)> {
    let (session, action) = custom_id.split_once(':')?;
    Some((session.parse().ok()?, action))
}

/// Shortens `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

/// Embed field value listing `tags` as `#tag`, cut to [`MAX_TAG_FIELD_CHARS`].
/// Never empty, since Discord rejects empty field values.
pub fn tag_field<S: AsRef<str>>(tags: &[S]) -> String {
    if tags.is_empty() {
        return "*none yet*".to_string();
    }
    let joined = tags
        .iter()
        .map(|t| format!("#{}", t.as_ref()))
        .collect::<Vec<_>>()
        .join(" ");
    preview(&joined, MAX_TAG_FIELD_CHARS)
}

/// Escapes markdown and mentions in user text before it is embedded in a message.
pub fn escape_markdown(text: &str) -> String {
    MessageBuilder::new().push_safe(text).build()
}
