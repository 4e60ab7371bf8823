//! Conversation thread log.
//!
//! Threads group sequential asks under an opaque `thread_id`. The log only
//! records exchanges; history is never interpolated back into prompts, and
//! threads are never garbage-collected.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::RwLock;

/// Message author within a thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single recorded message.
#[derive(Debug, Clone, Serialize)]
pub struct ThreadMessage {
    pub role: Role,
    pub content: String,
}

/// In-process log of conversation threads.
///
/// Threads are created implicitly on first use and live for the process
/// lifetime. Safe for concurrent callers.
#[derive(Default)]
pub struct ThreadLog {
    threads: RwLock<HashMap<String, Vec<ThreadMessage>>>,
}

impl ThreadLog {
    /// Create an empty thread log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user query and the generated answer to a thread.
    pub fn record_exchange(&self, thread_id: &str, query: &str, answer: &str) {
        let mut threads = self.threads.write().unwrap();
        let messages = threads.entry(thread_id.to_string()).or_default();
        messages.push(ThreadMessage {
            role: Role::User,
            content: query.to_string(),
        });
        messages.push(ThreadMessage {
            role: Role::Assistant,
            content: answer.to_string(),
        });
    }

    /// Get a copy of a thread's message history, oldest first.
    pub fn history(&self, thread_id: &str) -> Vec<ThreadMessage> {
        self.threads
            .read()
            .unwrap()
            .get(thread_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Number of known threads.
    pub fn thread_count(&self) -> usize {
        self.threads.read().unwrap().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_created_on_first_use() {
        let log = ThreadLog::new();
        assert_eq!(log.thread_count(), 0);
        assert!(log.history("t1").is_empty());

        log.record_exchange("t1", "question", "answer");
        assert_eq!(log.thread_count(), 1);
    }

    #[test]
    fn test_exchanges_accumulate_in_order() {
        let log = ThreadLog::new();
        log.record_exchange("t1", "q1", "a1");
        log.record_exchange("t1", "q2", "a2");

        let history = log.history("t1");
        assert_eq!(history.len(), 4);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "q1");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].content, "a1");
        assert_eq!(history[3].content, "a2");
    }

    #[test]
    fn test_threads_are_isolated() {
        let log = ThreadLog::new();
        log.record_exchange("t1", "q1", "a1");
        log.record_exchange("t2", "q2", "a2");

        assert_eq!(log.history("t1").len(), 2);
        assert_eq!(log.history("t2").len(), 2);
        assert_eq!(log.thread_count(), 2);
    }
}
