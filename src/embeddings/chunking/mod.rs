
use std::sync::LazyLock;

use fancy_regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use unicode_segmentation::UnicodeSegmentation;

/// Two or more consecutive newlines separate paragraphs
static PARAGRAPH_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{2,}").expect("regex is valid"));

/// Configuration for content chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Paragraphs longer than this many characters are split into sentences
    pub sentence_split_threshold: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            sentence_split_threshold: 200,
        }
    }
}

/// Split text into ordered, non-empty passages.
///
/// Paragraphs are separated by blank lines. Any paragraph longer than the
/// configured threshold is broken into its sentences; shorter paragraphs are
/// kept whole. The returned order is the positional identity used by the
/// vector index, so it must follow the document.
#[inline]
pub fn chunk_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    let mut chunks = Vec::new();

    for paragraph in split_paragraphs(text) {
        if paragraph.chars().count() > config.sentence_split_threshold {
            chunks.extend(split_sentences(paragraph));
        } else {
            chunks.push(paragraph.to_string());
        }
    }

    chunks.retain(|c| !c.is_empty());

    debug!(
        "Chunked {} characters into {} chunks",
        text.chars().count(),
        chunks.len()
    );
    chunks
}

/// Split on blank lines, trimming each paragraph and dropping empty ones
fn split_paragraphs(text: &str) -> Vec<&str> {
    let mut paragraphs = Vec::new();
    let mut start = 0;

    for found in PARAGRAPH_BREAK.find_iter(text) {
        match found {
            Ok(m) => {
                paragraphs.push(&text[start..m.start()]);
                start = m.end();
            }
            Err(e) => {
                // Keep the remainder as one paragraph
                warn!("Paragraph split aborted: {}", e);
                break;
            }
        }
    }
    paragraphs.push(&text[start..]);

    paragraphs
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Unicode (UAX #29) sentence segmentation, trimmed and without empty pieces.
///
/// UAX #29 always breaks after a line feed, so wrapped lines are joined with
/// a single space first. It also breaks after abbreviations such as "Dr." when
/// the next word is capitalized.
fn split_sentences(paragraph: &str) -> Vec<String> {
    let unwrapped = join_wrapped_lines(paragraph);
    unwrapped
        .split_sentence_bounds()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn join_wrapped_lines(paragraph: &str) -> String {
    paragraph
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Rough token estimate, used for log output only
#[inline]
pub fn estimate_token_count(text: &str) -> usize {
    // Rough heuristic: 1 token ≈ 0.75 words for English text
    let word_count = text.split_whitespace().count();
    let punct_count = text.chars().filter(|c| c.is_ascii_punctuation()).count();

    (punct_count as f64).mul_add(0.1, word_count as f64 / 0.75) as usize
}
