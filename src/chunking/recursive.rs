//! Recursive character splitting with overlap.
//!
//! Splits on a hierarchy of separators (paragraph break, line break, space,
//! empty string), preferring the coarsest separator that keeps pieces under
//! the size limit and recursing into finer separators for oversized pieces.

use std::collections::VecDeque;

/// Default separator hierarchy, coarsest first.
const DEFAULT_SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// Recursive character splitter.
///
/// Lengths are measured in characters, not bytes, so multi-byte text is
/// handled consistently.
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    /// Create a splitter with the default separator hierarchy.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Replace the separator hierarchy.
    pub fn with_separators(mut self, separators: Vec<String>) -> Self {
        self.separators = separators;
        self
    }

    /// Split `text` into chunks of at most `chunk_size` characters, adjacent
    /// chunks sharing roughly `chunk_overlap` characters at the boundary.
    ///
    /// A piece with no separator boundary available (a single atomic unit)
    /// may exceed the size limit; it is emitted whole rather than cut
    /// mid-unit.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        if text.is_empty() {
            return Vec::new();
        }
        self.split_with(text, &self.separators)
    }

    fn split_with(&self, text: &str, separators: &[String]) -> Vec<String> {
        // Pick the coarsest separator that actually occurs in the text.
        let mut separator = separators.last().cloned().unwrap_or_default();
        let mut remaining: &[String] = &[];
        for (i, sep) in separators.iter().enumerate() {
            if sep.is_empty() || text.contains(sep.as_str()) {
                separator = sep.clone();
                remaining = &separators[i + 1..];
                break;
            }
        }

        let splits = split_on(text, &separator);

        let mut chunks = Vec::new();
        let mut good_splits: Vec<String> = Vec::new();

        for piece in splits {
            if char_len(&piece) < self.chunk_size {
                good_splits.push(piece);
            } else {
                if !good_splits.is_empty() {
                    chunks.extend(self.merge_splits(&good_splits, &separator));
                    good_splits.clear();
                }
                if remaining.is_empty() {
                    // Atomic unit with no finer separator; keep it whole.
                    chunks.push(piece);
                } else {
                    chunks.extend(self.split_with(&piece, remaining));
                }
            }
        }

        if !good_splits.is_empty() {
            chunks.extend(self.merge_splits(&good_splits, &separator));
        }

        chunks
    }

    /// Greedily accumulate pieces into chunks, carrying the tail of each
    /// chunk into the next to produce the configured overlap.
    fn merge_splits(&self, splits: &[String], separator: &str) -> Vec<String> {
        let sep_len = char_len(separator);
        let mut chunks: Vec<String> = Vec::new();
        let mut current: VecDeque<&str> = VecDeque::new();
        let mut total = 0usize;

        for piece in splits {
            let len = char_len(piece);
            let joined_len = total + len + if current.is_empty() { 0 } else { sep_len };

            if joined_len > self.chunk_size && !current.is_empty() {
                if let Some(chunk) = join_pieces(&current, separator) {
                    chunks.push(chunk);
                }
                // Drop leading pieces until the carried tail fits the
                // overlap budget and the next piece fits the size limit.
                while total > self.chunk_overlap
                    || (total + len + if current.is_empty() { 0 } else { sep_len }
                        > self.chunk_size
                        && total > 0)
                {
                    let trailing_sep = if current.len() > 1 { sep_len } else { 0 };
                    match current.pop_front() {
                        Some(head) => total -= char_len(head) + trailing_sep,
                        None => break,
                    }
                }
            }

            current.push_back(piece);
            total += len + if current.len() > 1 { sep_len } else { 0 };
        }

        if let Some(chunk) = join_pieces(&current, separator) {
            chunks.push(chunk);
        }

        chunks
    }
}

/// Split on a separator, dropping empty pieces. An empty separator splits
/// into individual characters.
fn split_on(text: &str, separator: &str) -> Vec<String> {
    if separator.is_empty() {
        text.chars().map(|c| c.to_string()).collect()
    } else {
        text.split(separator)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}

fn join_pieces(pieces: &VecDeque<&str>, separator: &str) -> Option<String> {
    let joined = pieces
        .iter()
        .copied()
        .collect::<Vec<_>>()
        .join(separator)
        .trim()
        .to_string();
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}
