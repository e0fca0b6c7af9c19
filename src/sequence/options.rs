// src/sequence/options.rs

//! Caller-selected settings for one sequencing run.

use crate::errors::{Result, SeqdagError};
use crate::graph::TaskName;
use crate::sequence::cancel::CancellationToken;
use crate::sequence::exact::DEFAULT_BRUTE_FORCE_LIMIT;
use crate::types::Method;

#[derive(Debug, Clone)]
pub struct SequencingOptions {
    pub method: Method,

    /// Number of random starting points for the local search heuristics.
    ///
    /// `None` runs once from the contraction order of the coupled group.
    pub multi_start: Option<usize>,

    /// Seed for the multi-start shuffles.
    pub seed: u64,

    /// Full task order used verbatim by [`Method::Manual`].
    pub manual_order: Option<Vec<TaskName>>,

    /// Permutation count above which brute force warns.
    pub brute_force_limit: u64,

    /// Fail instead of warning when brute force exceeds the limit.
    pub abort_on_limit: bool,

    /// Worker threads for multi-start and exact search; `1` stays on the
    /// calling thread.
    pub workers: usize,

    pub cancel: CancellationToken,
}

impl Default for SequencingOptions {
    fn default() -> Self {
        Self {
            method: Method::default(),
            multi_start: None,
            seed: 0,
            manual_order: None,
            brute_force_limit: DEFAULT_BRUTE_FORCE_LIMIT,
            abort_on_limit: false,
            workers: 1,
            cancel: CancellationToken::new(),
        }
    }
}

impl SequencingOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn with_multi_start(mut self, starts: usize, seed: u64) -> Self {
        self.multi_start = Some(starts);
        self.seed = seed;
        self
    }

    pub fn with_manual_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<TaskName>,
    {
        self.method = Method::Manual;
        self.manual_order = Some(order.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Reject option combinations before any stage runs.
    pub fn validate(&self) -> Result<()> {
        if let Some(starts) = self.multi_start {
            if !self.method.supports_multi_start() {
                return Err(SeqdagError::InvalidMethodCombination {
                    method: self.method,
                    starts,
                });
            }
            if starts == 0 {
                return Err(SeqdagError::ConfigError(
                    "multi_start must be >= 1 (got 0)".to_string(),
                ));
            }
        }

        if self.workers == 0 {
            return Err(SeqdagError::ConfigError(
                "workers must be >= 1 (got 0)".to_string(),
            ));
        }

        if self.method == Method::Manual && self.manual_order.is_none() {
            return Err(SeqdagError::InvalidManualOrder(
                "method 'manual' requires an explicit task order".to_string(),
            ));
        }

        Ok(())
    }
}
