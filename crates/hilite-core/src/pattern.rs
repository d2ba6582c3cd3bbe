//! Composite lexical pattern: URLs, hashtags, mentions and cashtags.
//!
//! The four sub-patterns are alternated into one case-insensitive expression
//! with exactly one capturing group each. A match may consume one leading
//! context character (the "preceded by" rule), which is why match offsets go
//! through [`match_index_offset`] before they are used to place a highlight.

use std::fmt;
use std::ops::Range;
use std::sync::LazyLock;

use fancy_regex::{Regex, RegexBuilder};
use smol_str::SmolStr;

use crate::error::PatternError;

/// Number of capturing groups in a composite pattern (one per category).
pub const GROUP_COUNT: usize = 4;

/// Characters a URL path segment may contain besides word characters.
/// They are only kept when another word character follows.
const PATH_PUNCTUATION: &str = r"~!@$%&*\[\];:'|,.?";

/// TLDs compiled into the crate, used until a live list has been fetched.
const BUILTIN_TLDS: &[&str] = &[
    "com", "net", "org", "edu", "gov", "mil", "int", "info", "biz", "io", "co", "ai", "app",
    "dev", "me", "tv", "us", "uk", "ca", "de", "fr", "jp", "au", "in", "br", "ru", "cn", "nl",
    "es", "it", "ly", "gg", "xyz", "online", "site", "tech", "news", "blog", "xn--p1ai",
    "xn--80asehdb",
];

static BUILTIN_PATTERN: LazyLock<CompositePattern> = LazyLock::new(|| {
    build_pattern(&TldList::builtin()).expect("builtin TLD list must compile")
});

/// Lexical category of a highlighted run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HighlightKind {
    Url,
    Hashtag,
    Mention,
    Cashtag,
}

impl HighlightKind {
    /// Category for a 1-based capture group index of the composite pattern.
    pub fn from_group(index: usize) -> Option<Self> {
        match index {
            1 => Some(Self::Url),
            2 => Some(Self::Hashtag),
            3 => Some(Self::Mention),
            4 => Some(Self::Cashtag),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Url => "url",
            Self::Hashtag => "hashtag",
            Self::Mention => "mention",
            Self::Cashtag => "cashtag",
        }
    }
}

impl fmt::Display for HighlightKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Top-level domains split into the two classes the URL grammar knows.
///
/// `hyphenated` holds entries containing `--` (punycode and friends); they
/// are allowed to be followed by a hyphen, main TLDs are not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TldList {
    pub main: Vec<SmolStr>,
    pub hyphenated: Vec<SmolStr>,
}

impl TldList {
    /// Classify raw entries, lowercasing them and dropping blanks and duplicates.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut list = TldList::default();
        for entry in entries {
            let entry = entry.as_ref().trim().to_ascii_lowercase();
            if entry.is_empty() {
                continue;
            }
            let class = if entry.contains("--") {
                &mut list.hyphenated
            } else {
                &mut list.main
            };
            if !class.iter().any(|t| t == entry.as_str()) {
                class.push(SmolStr::new(entry));
            }
        }
        list
    }

    /// The list compiled into the crate.
    pub fn builtin() -> Self {
        Self::from_entries(BUILTIN_TLDS)
    }

    pub fn len(&self) -> usize {
        self.main.len() + self.hyphenated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One occurrence of the composite pattern in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexMatch {
    pub kind: HighlightKind,
    /// Char range of the highlighted text (context character excluded).
    pub range: Range<usize>,
    pub text: SmolStr,
}

/// Offset from a match index to the start of the highlighted span.
///
/// If the pattern consumed a leading context character the whole match is
/// longer than the captured group and the span starts one char later.
pub fn match_index_offset(whole: &str, group: &str) -> usize {
    if whole == group { 0 } else { 1 }
}

/// Compiled composite pattern. Immutable; refreshes build a new value.
#[derive(Debug, Clone)]
pub struct CompositePattern {
    regex: Regex,
}

impl CompositePattern {
    /// Rebuild a pattern from a previously stored [`source`](Self::source).
    pub fn from_source(source: &str) -> Result<Self, PatternError> {
        Self::compile(Regex::new(source)?)
    }

    /// Like [`from_source`](Self::from_source), with an explicit cap on
    /// backtracking steps per scan.
    pub fn with_backtrack_limit(source: &str, limit: usize) -> Result<Self, PatternError> {
        Self::compile(RegexBuilder::new(source).backtrack_limit(limit).build()?)
    }

    fn compile(regex: Regex) -> Result<Self, PatternError> {
        // captures_len counts the implicit whole-match group.
        let found = regex.captures_len().saturating_sub(1);
        if found != GROUP_COUNT {
            return Err(PatternError::GroupCount {
                expected: GROUP_COUNT,
                found,
            });
        }
        Ok(Self { regex })
    }

    /// Pattern built from the compiled-in TLD list.
    pub fn builtin() -> Self {
        BUILTIN_PATTERN.clone()
    }

    /// Stringified form, suitable for persisting and [`from_source`](Self::from_source).
    pub fn source(&self) -> &str {
        self.regex.as_str()
    }

    /// All non-overlapping matches in `text`, in ascending order.
    ///
    /// Hitting the backtracking limit fails the whole scan; a partial list is
    /// never returned.
    pub fn find_matches(&self, text: &str) -> Result<Vec<LexMatch>, PatternError> {
        let mut matches = Vec::new();
        // Running (byte, char) cursor; matches arrive in ascending order.
        let mut byte_pos = 0;
        let mut char_pos = 0;

        for caps in self.regex.captures_iter(text) {
            let caps = caps.map_err(|err| PatternError::ScanAborted(Box::new(err)))?;
            let Some(whole) = caps.get(0) else { continue };
            let Some((index, group)) =
                (1..=GROUP_COUNT).find_map(|i| caps.get(i).map(|m| (i, m)))
            else {
                continue;
            };
            let Some(kind) = HighlightKind::from_group(index) else {
                continue;
            };

            char_pos += text[byte_pos..whole.start()].chars().count();
            byte_pos = whole.start();

            let start = char_pos + match_index_offset(whole.as_str(), group.as_str());
            let len = group.as_str().chars().count();
            matches.push(LexMatch {
                kind,
                range: start..start + len,
                text: SmolStr::new(group.as_str()),
            });
        }

        Ok(matches)
    }

    /// Whether `text` is, in its entirety, a single match.
    pub fn is_exact_match(&self, text: &str) -> bool {
        match self.find_matches(text).as_deref() {
            Ok([only]) => only.range.start == 0 && only.range.end == text.chars().count(),
            _ => false,
        }
    }
}

impl PartialEq for CompositePattern {
    fn eq(&self, other: &Self) -> bool {
        self.source() == other.source()
    }
}

fn alternation(tlds: &[SmolStr]) -> String {
    let mut sorted: Vec<&str> = tlds.iter().map(SmolStr::as_str).collect();
    // Longest first so "co" never shadows "com".
    sorted.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    sorted
        .into_iter()
        .map(|t| fancy_regex::escape(t).into_owned())
        .collect::<Vec<_>>()
        .join("|")
}

fn url_pattern(tlds: &TldList) -> String {
    let label = r"[a-z0-9](?:[a-z0-9-]*[a-z0-9])?";
    let mut tld = String::new();
    if !tlds.main.is_empty() {
        tld.push_str(&format!("(?:{})(?![@\\-+])", alternation(&tlds.main)));
    }
    if !tlds.hyphenated.is_empty() {
        if !tld.is_empty() {
            tld.push('|');
        }
        tld.push_str(&format!("(?:{})", alternation(&tlds.hyphenated)));
    }
    // Atomic items: a word run is never split between two iterations, which
    // keeps a failed trailing check linear in the path length.
    let path = format!(r"(?:/(?>\w+|[{PATH_PUNCTUATION}]+(?=\w))*)*");

    format!(
        r"(?:^|[^\w@\-#$/.])((?:https?://)?(?:{label}\.)+(?:{tld}){path})(?=$|[^\w@\-+])"
    )
}

fn hashtag_pattern() -> &'static str {
    r"(?:^|\W)(#\w*\p{L}\w*)(?!://)(?=$|[^\w#])"
}

fn mention_pattern() -> &'static str {
    r"(?:^|[^\w@#$])(@\w+)(?!://)(?=$|[^\w@])"
}

fn cashtag_pattern() -> &'static str {
    r"(?:^|[^\w@#$])(\$[a-z]{1,6}(?:_[a-z]{1,2})?)(?![^\W_])"
}

/// Build the composite pattern from a TLD list.
pub fn build_pattern(tlds: &TldList) -> Result<CompositePattern, PatternError> {
    if tlds.is_empty() {
        return Err(PatternError::EmptyTldList);
    }

    let source = format!(
        "(?i){}|{}|{}|{}",
        url_pattern(tlds),
        hashtag_pattern(),
        mention_pattern(),
        cashtag_pattern()
    );
    tracing::debug!(
        main = tlds.main.len(),
        hyphenated = tlds.hyphenated.len(),
        source_len = source.len(),
        "building composite pattern"
    );
    CompositePattern::from_source(&source)
}
