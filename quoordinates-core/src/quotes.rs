// ABOUTME: Quote deduplication against already-visible message and thread content
// ABOUTME: Filters, renders, and enforces the platform message-size ceiling

use crate::metrics;
use crate::traits::{BookLookup, QuoteCandidate};

/// Hard platform limit on message length, in characters
pub const MESSAGE_CEILING: usize = 2000;

/// Text already visible to the user, computed fresh for every invocation
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    /// Content of the message the button is attached to
    pub source: String,
    /// Content of every message currently in the enclosing thread
    pub thread: Vec<String>,
}

impl ExclusionSet {
    pub fn from_source(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            thread: Vec::new(),
        }
    }

    pub fn with_thread(mut self, thread: Vec<String>) -> Self {
        self.thread = thread;
        self
    }

    /// True if `text` already appears literally anywhere in the set
    pub fn contains(&self, text: &str) -> bool {
        self.source.contains(text) || self.thread.iter().any(|m| m.contains(text))
    }
}

/// Render a quote block with its attribution.
///
/// The attribution links to the book when the lookup knows the title.
pub fn render_quote(quote: &QuoteCandidate, books: &dyn BookLookup) -> String {
    let attribution = match books.lookup(&quote.title) {
        Some(url) => format!("[{}]({})", quote.title, url),
        None => quote.title.clone(),
    };
    format!("> {}\n\n-- {}\n\n", quote.text, attribution)
}

/// Whether a rendered message fits under the platform ceiling
pub fn fits_message(rendered: &str) -> bool {
    rendered.chars().count() < MESSAGE_CEILING
}

/// Drop candidates already visible in `exclusions`, render the rest, and drop
/// renders that would not fit in one message. Search order is preserved.
pub fn filter_quotes<F>(
    candidates: Vec<QuoteCandidate>,
    exclusions: &ExclusionSet,
    render: F,
) -> Vec<String>
where
    F: Fn(&QuoteCandidate) -> String,
{
    let total = candidates.len();
    let mut duplicates = 0usize;
    let mut oversized = 0usize;

    let survivors: Vec<String> = candidates
        .into_iter()
        .filter(|q| {
            let seen = exclusions.contains(&q.text);
            if seen {
                duplicates += 1;
            }
            !seen
        })
        .map(|q| render(&q))
        .filter(|rendered| {
            let fits = fits_message(rendered);
            if !fits {
                oversized += 1;
            }
            fits
        })
        .collect();

    metrics::record_quotes_dropped("duplicate", duplicates);
    metrics::record_quotes_dropped("oversized", oversized);
    tracing::debug!(
        total,
        duplicates,
        oversized,
        survivors = survivors.len(),
        "Filtered quote candidates"
    );

    survivors
}
