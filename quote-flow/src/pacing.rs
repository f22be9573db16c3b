//! Deliberate pauses that make the conversation feel paced: the bot "typing",
//! options appearing after a message, and quote generation.
//!
//! The step controller never waits on any of these; front ends call a
//! [`Pacer`] around the controller.

use async_trait::async_trait;
use std::time::Duration;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pause {
    /// Before a bot message appears
    Typing,
    /// Before the options of a question are shown
    Reveal,
    /// While a quote is being generated
    QuoteGeneration,
}

/// A timed wait that always completes
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, pause: Pause);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone)]
pub struct TokioPacer {
    typing: Duration,
    reveal: Duration,
    generation: Duration,
}

impl TokioPacer {
    pub fn new(typing: Duration, reveal: Duration, generation: Duration) -> Self {
        Self {
            typing,
            reveal,
            generation,
        }
    }

    pub fn duration(&self, pause: Pause) -> Duration {
        match pause {
            Pause::Typing => self.typing,
            Pause::Reveal => self.reveal,
            Pause::QuoteGeneration => self.generation,
        }
    }
}

impl Default for TokioPacer {
    fn default() -> Self {
        Self::new(
            Duration::from_millis(1500),
            Duration::from_millis(1000),
            Duration::from_millis(2000),
        )
    }
}

#[async_trait]
impl Pacer for TokioPacer {
    async fn pause(&self, pause: Pause) {
        let duration = self.duration(pause);
        trace!(?pause, ?duration, "pausing");
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }
}

/// Never waits. For tests and scripted runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstantPacer;

#[async_trait]
impl Pacer for InstantPacer {
    async fn pause(&self, _pause: Pause) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn default_timings() {
        let pacer = TokioPacer::default();
        assert_eq!(pacer.duration(Pause::Typing), Duration::from_millis(1500));
        assert_eq!(pacer.duration(Pause::Reveal), Duration::from_millis(1000));
        assert_eq!(pacer.duration(Pause::QuoteGeneration), Duration::from_millis(2000));
    }

    #[tokio::test]
    async fn short_pauses_complete() {
        let pacer = TokioPacer::new(Duration::ZERO, Duration::ZERO, Duration::from_millis(20));
        let started = Instant::now();
        pacer.pause(Pause::QuoteGeneration).await;
        assert!(started.elapsed() >= Duration::from_millis(20));
        pacer.pause(Pause::Typing).await;
    }

    #[tokio::test]
    async fn instant_pacer_does_not_wait() {
        let started = Instant::now();
        InstantPacer.pause(Pause::QuoteGeneration).await;
        assert!(started.elapsed() < Duration::from_millis(500));
    }
}
