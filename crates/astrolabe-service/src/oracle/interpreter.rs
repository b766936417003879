use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use astrolabe::interpretation::{build_prompt, ParseOutcome, Reading, ReadingRequest};

use crate::oracle::{OracleError, TextOracle};

/// Where a reading's text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingSource {
    Oracle,
    Fallback,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation<R> {
    pub reading: R,
    pub source: ReadingSource,
    pub outcome: ParseOutcome,
}

impl<R: Reading> Interpretation<R> {
    fn fallback() -> Self {
        Self {
            reading: R::fallback(),
            source: ReadingSource::Fallback,
            outcome: ParseOutcome::Fallback,
        }
    }
}

/// Prompt → oracle → typed reading. Never fails: every oracle problem ends in the
/// template's fallback reading.
#[derive(Clone)]
pub struct Interpreter {
    oracle: Arc<dyn TextOracle>,
    timeout: Duration,
}

impl Interpreter {
    pub fn new(oracle: Arc<dyn TextOracle>, timeout: Duration) -> Self {
        Self { oracle, timeout }
    }

    pub async fn interpret<R: Reading>(&self, request: &ReadingRequest<'_>) -> Interpretation<R> {
        let template = request.template();
        if template != R::TEMPLATE {
            log::error!(
                "Reading type for {} requested with a {} prompt",
                R::TEMPLATE,
                template
            );
            return Interpretation::fallback();
        }

        let prompt = build_prompt(request);
        let raw = match tokio::time::timeout(self.timeout, self.oracle.complete(&prompt)).await {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => {
                log::warn!("Oracle failed for {} reading: {}", template, e);
                return Interpretation::fallback();
            }
            Err(_) => {
                log::warn!(
                    "Oracle failed for {} reading: {}",
                    template,
                    OracleError::Timeout(self.timeout)
                );
                return Interpretation::fallback();
            }
        };

        let (reading, outcome) = R::parse(&raw);
        let source = match outcome {
            ParseOutcome::Fallback => ReadingSource::Fallback,
            _ => ReadingSource::Oracle,
        };
        Interpretation {
            reading,
            source,
            outcome,
        }
    }
}
