use std::sync::LazyLock;

use regex::Regex;

use crate::{
    models::{Category, ConfessionRecord, NewConfession},
    service::{ConfessionService, SubmissionError},
};

pub const MIN_CONTENT_CHARS: usize = 10;
pub const MAX_CONTENT_CHARS: usize = 1000;
pub const MIN_CODE_CHARS: usize = 4;
pub const MAX_CODE_CHARS: usize = 8;
pub const FALLBACK_HASHTAG: &str = "secret";

/// Quick emojis offered next to the text box.
pub const QUICK_EMOJIS: [&str; 24] = [
    "😂", "🤣", "🤫", "😤", "😭", "💀", "🔥", "✨", "💘", "😍", "🍿", "🌈", "🙌", "📚", "💬", "🥺",
    "🫠", "🫡", "🫣", "🥵", "🥳", "🤯", "🍕", "🎉",
];

// `[[:word:]]` is the ASCII word class, so non-ASCII letters end a tag.
static HASHTAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#([[:word:]]+)").expect("hashtag pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Your confession must be at least 10 characters.")]
    ContentTooShort,
    #[error("Secret code must be at least 4 digits.")]
    CodeTooShort,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComposeError {
    #[error("a submission is already in flight")]
    Busy,
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Rejected(#[from] SubmissionError),
}

pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

fn truncate_chars(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

/// Checks content first, then the secret code. Both are measured after trimming.
pub fn validate(content: &str, secret_code: &str) -> Result<(), ValidationError> {
    if char_len(content.trim()) < MIN_CONTENT_CHARS {
        return Err(ValidationError::ContentTooShort);
    }
    if char_len(secret_code.trim()) < MIN_CODE_CHARS {
        return Err(ValidationError::CodeTooShort);
    }
    Ok(())
}

/// Returns every `#tag` in `content` without the `#`, in order of appearance.
/// Content without tags yields `["secret"]`.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let tags: Vec<String> = HASHTAG
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect();

    if tags.is_empty() {
        vec![FALLBACK_HASHTAG.to_string()]
    } else {
        tags
    }
}

/// Form state of one composer instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    content: String,
    category: Category,
    secret_code: String,
    error: Option<String>,
    is_submitting: bool,
    vibe_menu_open: bool,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn secret_code(&self) -> &str {
        &self.secret_code
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn is_vibe_menu_open(&self) -> bool {
        self.vibe_menu_open
    }

    pub fn set_content(&mut self, content: &str) {
        self.content = truncate_chars(content, MAX_CONTENT_CHARS);
    }

    pub fn set_secret_code(&mut self, code: &str) {
        self.secret_code = truncate_chars(code, MAX_CODE_CHARS);
    }

    /// Appends an emoji unless that would push the content past the cap.
    pub fn append_emoji(&mut self, emoji: &str) -> bool {
        if char_len(&self.content) + char_len(emoji) > MAX_CONTENT_CHARS {
            return false;
        }
        self.content.push_str(emoji);
        true
    }

    pub fn toggle_vibe_menu(&mut self) {
        self.vibe_menu_open = !self.vibe_menu_open;
    }

    pub fn select_category(&mut self, category: Category) {
        self.category = category;
        self.vibe_menu_open = false;
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn char_count(&self) -> usize {
        char_len(&self.content)
    }

    /// True while something has been typed but not yet enough.
    pub fn content_warning(&self) -> bool {
        let len = self.char_count();
        len > 0 && len < MIN_CONTENT_CHARS
    }

    pub fn code_warning(&self) -> bool {
        let len = char_len(&self.secret_code);
        len > 0 && len < MIN_CODE_CHARS
    }

    pub fn can_submit(&self) -> bool {
        !self.is_submitting && validate(&self.content, &self.secret_code).is_ok()
    }

    /// Validates the form and marks it as submitting. The returned request is
    /// handed to the service, and its outcome fed back through
    /// [`Composer::finish_submit`].
    pub fn begin_submit(&mut self) -> Result<NewConfession, ComposeError> {
        if self.is_submitting {
            return Err(ComposeError::Busy);
        }
        self.error = None;

        if let Err(e) = validate(&self.content, &self.secret_code) {
            self.error = Some(e.to_string());
            return Err(e.into());
        }

        self.is_submitting = true;
        Ok(NewConfession {
            content: self.content.clone(),
            category: self.category,
            secret_code: self.secret_code.clone(),
            hashtags: extract_hashtags(&self.content),
        })
    }

    /// Clears the form on success; keeps it intact and records the message on failure.
    pub fn finish_submit(
        &mut self,
        outcome: Result<ConfessionRecord, SubmissionError>,
    ) -> Result<ConfessionRecord, ComposeError> {
        self.is_submitting = false;
        match outcome {
            Ok(record) => {
                *self = Self::default();
                Ok(record)
            }
            Err(e) => {
                self.error = Some(e.user_message().to_string());
                Err(e.into())
            }
        }
    }

    pub async fn submit(
        &mut self,
        service: &dyn ConfessionService,
    ) -> Result<ConfessionRecord, ComposeError> {
        let request = self.begin_submit()?;
        let outcome = service.submit(request).await;
        self.finish_submit(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingService {
        calls: Mutex<Vec<NewConfession>>,
        reject_with: Option<SubmissionError>,
    }

    #[async_trait]
    impl ConfessionService for RecordingService {
        async fn submit(
            &self,
            request: NewConfession,
        ) -> Result<ConfessionRecord, SubmissionError> {
            self.calls.lock().unwrap().push(request.clone());
            if let Some(err) = &self.reject_with {
                return Err(err.clone());
            }
            Ok(ConfessionRecord {
                id: "c-1".to_string(),
                content: request.content,
                category: request.category,
                hashtags: request.hashtags,
                secret_code: request.secret_code,
                created_at: Utc::now(),
                reactions: Default::default(),
            })
        }
    }

    fn filled(content: &str, code: &str) -> Composer {
        let mut composer = Composer::new();
        composer.set_content(content);
        composer.set_secret_code(code);
        composer
    }

    #[test]
    fn test_extracts_hashtags_in_order() {
        assert_eq!(
            extract_hashtags("I love #cats and #Dogs123"),
            vec!["cats", "Dogs123"]
        );
    }

    #[test]
    fn test_hashtag_fallback() {
        assert_eq!(extract_hashtags("no tags in here at all"), vec!["secret"]);
        assert_eq!(extract_hashtags("a lone # sign"), vec!["secret"]);
    }

    #[test]
    fn test_hashtag_stops_at_non_word_chars() {
        assert_eq!(
            extract_hashtags("#snake_case-rest #a#b #café"),
            vec!["snake_case", "a", "b", "caf"]
        );
    }

    #[test]
    fn test_validate_trims_content() {
        assert_eq!(
            validate("   short   ", "1234"),
            Err(ValidationError::ContentTooShort)
        );
        assert_eq!(validate("long enough now", "1234"), Ok(()));
    }

    #[test]
    fn test_validate_checks_content_before_code() {
        assert_eq!(validate("tiny", "1"), Err(ValidationError::ContentTooShort));
        assert_eq!(
            validate("long enough now", " 12 "),
            Err(ValidationError::CodeTooShort)
        );
    }

    #[test]
    fn test_inputs_are_capped() {
        let mut composer = Composer::new();
        composer.set_content(&"x".repeat(1200));
        composer.set_secret_code("123456789");
        assert_eq!(composer.char_count(), MAX_CONTENT_CHARS);
        assert_eq!(composer.secret_code(), "12345678");
        assert!(!composer.append_emoji("🔥"));
    }

    #[test]
    fn test_append_emoji() {
        let mut composer = filled("hello", "");
        assert!(composer.append_emoji("🔥"));
        assert_eq!(composer.content(), "hello🔥");
        assert_eq!(composer.char_count(), 6);
    }

    #[test]
    fn test_field_warnings() {
        let composer = filled("abc", "12");
        assert!(composer.content_warning());
        assert!(composer.code_warning());
        assert!(!composer.can_submit());

        let empty = Composer::new();
        assert!(!empty.content_warning());
        assert!(!empty.code_warning());
    }

    #[test]
    fn test_select_category_closes_menu() {
        let mut composer = Composer::new();
        assert_eq!(composer.category(), Category::General);
        composer.toggle_vibe_menu();
        assert!(composer.is_vibe_menu_open());
        composer.select_category(Category::Crush);
        assert_eq!(composer.category(), Category::Crush);
        assert!(!composer.is_vibe_menu_open());
    }

    #[test]
    fn test_begin_submit_blocks_second_submission() {
        let mut composer = filled("this is long enough", "1234");
        assert!(composer.begin_submit().is_ok());
        assert!(composer.is_submitting());
        assert!(!composer.can_submit());
        assert_eq!(composer.begin_submit(), Err(ComposeError::Busy));
    }

    #[tokio::test]
    async fn test_short_content_never_reaches_service() {
        let service = RecordingService::default();
        let mut composer = filled("   too short  ", "1234");

        let result = composer.submit(&service).await;

        assert_eq!(
            result,
            Err(ComposeError::Invalid(ValidationError::ContentTooShort))
        );
        assert_eq!(
            composer.error(),
            Some("Your confession must be at least 10 characters.")
        );
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_short_code_never_reaches_service() {
        let service = RecordingService::default();
        let mut composer = filled("a perfectly long confession", "12 ");

        let result = composer.submit(&service).await;

        assert_eq!(
            result,
            Err(ComposeError::Invalid(ValidationError::CodeTooShort))
        );
        assert!(service.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_successful_submit_resets_form() {
        let service = RecordingService::default();
        let mut composer = filled("I love #cats and #Dogs123", "4321");
        composer.select_category(Category::Funny);

        let record = composer.submit(&service).await.unwrap();

        let calls = service.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].category, Category::Funny);
        assert_eq!(calls[0].secret_code, "4321");
        assert_eq!(calls[0].hashtags, vec!["cats", "Dogs123"]);
        assert_eq!(record.hashtags, vec!["cats", "Dogs123"]);
        assert_eq!(composer, Composer::default());
    }

    #[tokio::test]
    async fn test_rejected_submit_keeps_form() {
        let service = RecordingService {
            reject_with: Some(SubmissionError::new("Server is busy.")),
            ..Default::default()
        };
        let mut composer = filled("nothing to tag here", "9999");
        composer.select_category(Category::Rant);

        let result = composer.submit(&service).await;

        assert!(matches!(result, Err(ComposeError::Rejected(_))));
        assert_eq!(composer.error(), Some("Server is busy."));
        assert_eq!(composer.content(), "nothing to tag here");
        assert_eq!(composer.secret_code(), "9999");
        assert_eq!(composer.category(), Category::Rant);
        assert!(!composer.is_submitting());
        assert_eq!(
            service.calls.lock().unwrap()[0].hashtags,
            vec!["secret"]
        );
    }

    #[tokio::test]
    async fn test_rejection_without_message_uses_fallback() {
        let service = RecordingService {
            reject_with: Some(SubmissionError::without_message()),
            ..Default::default()
        };
        let mut composer = filled("nothing to tag here", "9999");

        let _ = composer.submit(&service).await;

        assert_eq!(composer.error(), Some("Failed to post. Please try again."));
    }
}
