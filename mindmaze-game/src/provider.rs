//! Challenge content providers and the offline fallback policy.
//!
//! A provider failure never reaches the player: any error, invalid payload or timeout is
//! replaced with a random question from the offline bank.
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::question::{QuestionData, QuestionError, random_offline};

/// Remote or local source of challenge questions.
pub trait QuestionSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetch a question for the given difficulty (the current level).
    ///
    /// # Errors
    ///
    /// Returns an error when the source cannot produce a question.
    fn fetch(&mut self, difficulty: u32) -> Result<QuestionData, Self::Error>;
}

/// Errors a provider may report. All of them trigger the offline fallback.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProviderError {
    #[error("question provider is not configured or offline")]
    Unavailable,
    #[error("question provider transport failed: {0}")]
    Transport(String),
    #[error("question provider timed out")]
    Timeout,
    #[error(transparent)]
    Payload(#[from] QuestionError),
}

/// Where a delivered question came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionOrigin {
    Provider,
    Offline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub question: QuestionData,
    pub origin: QuestionOrigin,
}

impl Fetched {
    fn offline<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            question: random_offline(rng),
            origin: QuestionOrigin::Offline,
        }
    }
}

/// Source with no provider behind it; every fetch falls back to the offline bank.
#[derive(Debug, Clone, Copy, Default)]
pub struct Offline;

impl QuestionSource for Offline {
    type Error = ProviderError;

    fn fetch(&mut self, _difficulty: u32) -> Result<QuestionData, Self::Error> {
        Err(ProviderError::Unavailable)
    }
}

/// Adapter turning a raw JSON producer into a question source.
pub struct JsonSource<F> {
    produce: F,
}

impl<F> JsonSource<F>
where
    F: FnMut(u32) -> Result<String, ProviderError>,
{
    pub const fn new(produce: F) -> Self {
        Self { produce }
    }
}

impl<F> QuestionSource for JsonSource<F>
where
    F: FnMut(u32) -> Result<String, ProviderError>,
{
    type Error = ProviderError;

    fn fetch(&mut self, difficulty: u32) -> Result<QuestionData, Self::Error> {
        let raw = (self.produce)(difficulty)?;
        Ok(QuestionData::from_json(&raw)?)
    }
}

/// Fetch from `source`, substituting an offline question on any failure.
pub fn fetch_or_fallback<S, R>(source: &mut S, difficulty: u32, rng: &mut R) -> Fetched
where
    S: QuestionSource + ?Sized,
    R: Rng + ?Sized,
{
    match source.fetch(difficulty) {
        Ok(question) => accept_or_fallback(question, rng),
        Err(err) => {
            log::warn!("question provider failed, using offline bank: {err}");
            Fetched::offline(rng)
        }
    }
}

fn accept_or_fallback<R: Rng + ?Sized>(question: QuestionData, rng: &mut R) -> Fetched {
    match question.validate() {
        Ok(()) => Fetched {
            question,
            origin: QuestionOrigin::Provider,
        },
        Err(err) => {
            log::warn!("provider returned an invalid question, using offline bank: {err}");
            Fetched::offline(rng)
        }
    }
}

#[cfg(feature = "async")]
pub use self::nonblocking::{AsyncQuestionSource, fetch_with_timeout};

#[cfg(feature = "async")]
mod nonblocking {
    use super::{Fetched, QuestionData, accept_or_fallback};
    use rand::Rng;
    use std::future::Future;
    use std::time::Duration;

    /// Asynchronous question source, e.g. a network-backed generator.
    pub trait AsyncQuestionSource {
        type Error: std::error::Error + Send + Sync + 'static;

        fn fetch(&self, difficulty: u32)
        -> impl Future<Output = Result<QuestionData, Self::Error>>;
    }

    /// Await `source` for at most `timeout`, falling back to the offline bank.
    pub async fn fetch_with_timeout<S, R>(
        source: &S,
        difficulty: u32,
        timeout: Duration,
        rng: &mut R,
    ) -> Fetched
    where
        S: AsyncQuestionSource + ?Sized,
        R: Rng + ?Sized,
    {
        match tokio::time::timeout(timeout, source.fetch(difficulty)).await {
            Ok(Ok(question)) => accept_or_fallback(question, rng),
            Ok(Err(err)) => {
                log::warn!("question provider failed, using offline bank: {err}");
                Fetched::offline(rng)
            }
            Err(_) => {
                log::warn!("question provider timed out after {timeout:?}, using offline bank");
                Fetched::offline(rng)
            }
        }
    }

}
