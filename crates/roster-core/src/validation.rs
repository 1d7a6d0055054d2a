//! Keyword checks applied before a search reaches the store.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;

/// Characters a mail keyword may consist of unless configured otherwise.
pub const DEFAULT_MAIL_ALLOWED_CHARS: &str = "popy0123456789@example.com";

// Hiragana, katakana, katakana phonetic extensions, the prolonged sound mark
// and the ideographic space.
static KANA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\u{3040}-\u{3096}\u{30A0}-\u{30FF}\u{31F0}-\u{31FF}ー\u{3000}]+$")
        .expect("kana pattern is a valid regex")
});

/// True when `keyword` is written entirely in kana.
pub fn is_kana(keyword: &str) -> bool {
    KANA.is_match(keyword)
}

/// Restricts mail keywords to a fixed character set.
#[derive(Clone, Debug)]
pub struct MailKeywordRule {
    allowed: Regex,
}

impl MailKeywordRule {
    /// Build a rule accepting keywords made only of `allowed_chars`.
    ///
    /// Fails when `allowed_chars` is empty.
    pub fn new(allowed_chars: &str) -> Result<Self, regex::Error> {
        let class: String = allowed_chars
            .chars()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|c| regex::escape(c.encode_utf8(&mut [0; 4])))
            .collect();
        let allowed = Regex::new(&format!("^[{}]+$", class))?;
        Ok(Self { allowed })
    }

    pub fn is_valid(&self, keyword: &str) -> bool {
        self.allowed.is_match(keyword)
    }
}

impl Default for MailKeywordRule {
    fn default() -> Self {
        Self::new(DEFAULT_MAIL_ALLOWED_CHARS).expect("default mail characters form a valid class")
    }
}
