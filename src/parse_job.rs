//! Parsing of pasted text, in the background when the text is large.
//!
//! Every submission carries the generation number of the text it was made
//! from. Results are applied only if their generation is still the latest,
//! so a slow parse of old text can never overwrite a newer result.

use std::time::{Duration, Instant};

use tokio::sync::mpsc;

use crate::parser::{self, ParseIssue, ParsedLog};

/// A finished parse of one generation of the input text
#[derive(Debug)]
pub struct ParseOutcome {
    pub generation: u64,
    pub parsed: Option<ParsedLog>,
    /// Why `parsed` is `None`
    pub issue: Option<ParseIssue>,
    pub elapsed: Duration,
}

impl ParseOutcome {
    fn run(generation: u64, raw: &str) -> Self {
        let started = Instant::now();
        let parsed = parser::parse(raw);
        let issue = if parsed.is_none() {
            parser::diagnose(raw)
        } else {
            None
        };
        Self {
            generation,
            parsed,
            issue,
            elapsed: started.elapsed(),
        }
    }
}

/// Runs parses inline or on the blocking pool depending on input size
pub struct ParseWorker {
    tx: mpsc::Sender<ParseOutcome>,
    threshold: usize,
}

impl ParseWorker {
    /// Create a worker and the receiver background results arrive on
    pub fn new(threshold: usize, buffer_size: usize) -> (Self, mpsc::Receiver<ParseOutcome>) {
        let (tx, rx) = mpsc::channel(buffer_size);
        (Self { tx, threshold }, rx)
    }

    /// Parse `raw` as generation `generation`.
    ///
    /// Small input is parsed immediately and returned. Large input is
    /// handed to the blocking pool and delivered later on the receiver;
    /// in that case this returns `None`.
    pub fn submit(&self, generation: u64, raw: String) -> Option<ParseOutcome> {
        if raw.len() <= self.threshold {
            return Some(ParseOutcome::run(generation, &raw));
        }

        tracing::debug!(generation, bytes = raw.len(), "parsing in background");
        let tx = self.tx.clone();
        tokio::task::spawn_blocking(move || {
            let outcome = ParseOutcome::run(generation, &raw);
            // Receiver dropped means the app is shutting down
            let _ = tx.blocking_send(outcome);
        });
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_small_input_parses_inline() {
        let (worker, _rx) = ParseWorker::new(1024, 4);
        let outcome = worker.submit(3, "#Fields: a\n1".to_string()).unwrap();
        assert_eq!(outcome.generation, 3);
        assert_eq!(outcome.parsed.unwrap().rows.len(), 1);
        assert_eq!(outcome.issue, None);
    }

    #[test]
    fn test_inline_issue_is_reported() {
        let (worker, _rx) = ParseWorker::new(1024, 4);
        let outcome = worker.submit(1, "hello".to_string()).unwrap();
        assert!(outcome.parsed.is_none());
        assert_eq!(outcome.issue, Some(ParseIssue::MissingFieldsDirective));
    }

    #[tokio::test]
    async fn test_large_input_arrives_on_channel() {
        let (worker, mut rx) = ParseWorker::new(8, 4);
        assert!(worker.submit(1, "#Fields: a b\n1 2\n3 4".to_string()).is_none());
        assert!(worker.submit(2, "#Fields: a b c\n1 2 3".to_string()).is_none());

        let mut outcomes = vec![rx.recv().await.unwrap(), rx.recv().await.unwrap()];
        outcomes.sort_by_key(|o| o.generation);
        assert_eq!(outcomes[0].parsed.as_ref().unwrap().rows.len(), 2);
        assert_eq!(outcomes[1].parsed.as_ref().unwrap().field_names().len(), 3);
    }
}
