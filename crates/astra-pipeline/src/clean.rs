//! Free-text cleaning applied before translation.

use std::sync::LazyLock;

use regex::Regex;

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?\S+|www\S+").expect("valid regex"));

static BRACKET_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[.*?\]").expect("valid regex"));

static MENTION_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@\w+").expect("valid regex"));

// Emoticons, pictographs, transport, flags, dingbats, enclosed characters,
// miscellaneous symbols, supplemental pictographs and the emoji joiners.
// Scripts between U+24C2 and U+1F170 (CJK among them) are left intact.
static EMOJI_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        "[",
        r"\x{1F600}-\x{1F64F}",
        r"\x{1F300}-\x{1F5FF}",
        r"\x{1F680}-\x{1F6FF}",
        r"\x{1F1E0}-\x{1F1FF}",
        r"\x{2702}-\x{27B0}",
        r"\x{24C2}",
        r"\x{1F170}-\x{1F251}",
        r"\x{2600}-\x{26FF}",
        r"\x{1F900}-\x{1F9FF}",
        r"\x{FE0F}\x{200D}",
        "]+"
    ))
    .expect("valid regex")
});

/// Strip URLs, bracketed tags, mentions, `#` marks and emoji, then collapse
/// whitespace. An empty result means the comment has no analyzable text.
#[must_use]
pub fn clean_text(text: &str) -> String {
    if text.trim().is_empty() {
        return String::new();
    }
    let text = URL_RE.replace_all(text, "");
    let text = BRACKET_TAG_RE.replace_all(&text, "");
    let text = MENTION_RE.replace_all(&text, "");
    let text = text.replace('#', "");
    let text = EMOJI_RE.replace_all(&text, "");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
