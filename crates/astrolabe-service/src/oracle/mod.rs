//! Text-generation oracle: the client contract, the Groq implementation and the
//! interpreter that turns prompts into typed readings.

pub mod groq;
pub mod interpreter;

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use astrolabe::interpretation::Prompt;

pub use groq::GroqOracle;
pub use interpreter::{Interpretation, Interpreter, ReadingSource};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Oracle request failed: {0}")]
    Transport(String),
    #[error("Oracle returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Oracle did not answer within {0:?}")]
    Timeout(Duration),
    #[error("Oracle returned an empty completion")]
    EmptyCompletion,
}

/// Anything that can answer a rendered prompt with text.
#[async_trait]
pub trait TextOracle: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> Result<String, OracleError>;
}
