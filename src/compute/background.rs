//! Rule search on a worker thread.
//!
//! The worker owns its own random stream and hands the finished outcome back
//! through a single-slot channel, so the driver only ever sees a complete
//! result.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use crate::schema::{SearchConfig, SearchConfigError, SearchOutcome};

use super::LifeRng;
use super::evolution::{RuleSearch, SearchError};

type SearchResult = Result<SearchOutcome, SearchError>;

/// Handle to a rule search running on another thread.
pub struct BackgroundSearch {
    receiver: Receiver<SearchResult>,
    cancel: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl BackgroundSearch {
    /// Start searching on a worker that owns `rng`.
    pub fn spawn(config: SearchConfig, mut rng: LifeRng) -> Result<Self, SearchConfigError> {
        let search = RuleSearch::new(config)?;
        let cancel = search.cancel_handle();
        let (sender, receiver) = mpsc::sync_channel(1);

        let thread = thread::spawn(move || {
            // The receiver may already be gone if the driver shut down
            let _ = sender.send(search.run(&mut rng));
        });

        Ok(Self {
            receiver,
            cancel,
            thread: Some(thread),
        })
    }

    /// Take the result if the search has finished (non-blocking).
    pub fn poll(&mut self) -> Option<SearchResult> {
        match self.receiver.try_recv() {
            Ok(result) => {
                self.join();
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.join();
                Some(Err(SearchError::Disconnected))
            }
        }
    }

    /// Block until the search finishes.
    pub fn wait(mut self) -> SearchResult {
        let result = self
            .receiver
            .recv()
            .unwrap_or(Err(SearchError::Disconnected));
        self.join();
        result
    }

    /// Ask the worker to stop at its next check.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    fn join(&mut self) {
        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            log::error!("Rule search worker panicked");
        }
    }
}

impl Drop for BackgroundSearch {
    fn drop(&mut self) {
        self.cancel();
        self.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::evolution::random_rule;
    use crate::schema::StopReason;

    #[test]
    fn test_wait_matches_foreground_search() {
        let config = SearchConfig {
            threshold: 1e9,
            max_attempts: Some(2),
            ..Default::default()
        };
        let background = BackgroundSearch::spawn(config.clone(), LifeRng::new(12)).unwrap();
        let foreground = RuleSearch::new(config)
            .unwrap()
            .run(&mut LifeRng::new(12))
            .unwrap();

        let outcome = background.wait().unwrap();
        assert_eq!(outcome.rule, foreground.rule);
        assert_eq!(outcome.attempts, 2);
        assert_eq!(outcome.stop_reason, StopReason::AttemptsExhausted);
    }

    #[test]
    fn test_poll_eventually_yields() {
        let config = SearchConfig {
            threshold: -1e300,
            max_attempts: Some(1),
            ..Default::default()
        };
        let mut background = BackgroundSearch::spawn(config, LifeRng::new(3)).unwrap();
        let result = loop {
            if let Some(result) = background.poll() {
                break result;
            }
            thread::yield_now();
        };
        let outcome = result.unwrap();
        assert_eq!(outcome.attempts, 1);
        assert_eq!(outcome.rule, random_rule(&mut LifeRng::new(3)));
    }

    #[test]
    fn test_cancel_unbounded_search() {
        let background =
            BackgroundSearch::spawn(SearchConfig::unbounded(1e9), LifeRng::new(5)).unwrap();
        background.cancel();
        let result = background.wait();
        assert!(matches!(result, Err(SearchError::Cancelled { .. })));
    }

    #[test]
    fn test_drop_abandons_search() {
        let background =
            BackgroundSearch::spawn(SearchConfig::unbounded(1e9), LifeRng::new(6)).unwrap();
        // Must return promptly rather than search forever
        drop(background);
    }
}
