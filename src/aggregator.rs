//! Response aggregation: decouples the arrival rate of deltas from the
//! emission rate of observable snapshots.
//!
//! Deltas arrive network-bound and bursty; observers want a bounded-rate
//! stream of snapshots. The aggregator accumulates every delta, emits a
//! snapshot at most once per scheduler tick, and guarantees that the final
//! snapshot equals the authoritative terminal payload.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::stream::StreamEvent;

/// Observable state of one in-flight execution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    pub content: String,
    pub thinking: String,
}

/// A single-shot, re-armable tick used to pace snapshot emission.
///
/// Stands in for the UI redraw clock the display layer would otherwise
/// provide; the default implementation is a small fixed Tokio timer.
pub trait FlushScheduler: Send {
    /// Arm the tick. The returned future resolves when it fires; dropping it
    /// disarms. The owning drain loop keeps at most one armed at a time.
    fn tick(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send>>;
}

/// Timer-backed scheduler with a fixed interval.
pub struct TokioScheduler {
    interval: Duration,
}

impl TokioScheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Default for TokioScheduler {
    fn default() -> Self {
        // One tick per ~2 frames at 60Hz; fast enough to feel live, slow
        // enough to coalesce bursts.
        Self::new(Duration::from_millis(30))
    }
}

impl FlushScheduler for TokioScheduler {
    fn tick(&mut self) -> Pin<Box<dyn Future<Output = ()> + Send>> {
        Box::pin(tokio::time::sleep(self.interval))
    }
}

/// Callback receiving snapshots for one execution.
pub type SnapshotObserver = Arc<dyn Fn(Snapshot) + Send + Sync>;

/// Per-execution accumulation buffer.
///
/// Exclusively owned by one execution's task; created at execution start and
/// discarded once the terminal event has been finalized. At most one flush
/// may be armed at a time, which the owning drain loop enforces via
/// [`flush_armed`](Self::flush_armed).
#[derive(Debug, Default)]
pub struct ResponseAggregator {
    content: String,
    thinking: String,
    emitted_content_len: usize,
    emitted_thinking_len: usize,
    flush_armed: bool,
    closed: bool,
}

impl ResponseAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a delta to the buffer. Returns `true` when the caller must arm
    /// a flush tick (none was outstanding and the buffer grew).
    pub fn on_delta(&mut self, event: &StreamEvent) -> bool {
        if self.closed {
            return false;
        }
        let grew = match event {
            StreamEvent::ContentDelta { delta } => {
                self.content.push_str(delta);
                !delta.is_empty()
            }
            StreamEvent::ThinkingDelta { delta } => {
                self.thinking.push_str(delta);
                !delta.is_empty()
            }
            StreamEvent::StreamEnd { .. } => false,
        };
        if grew && !self.flush_armed {
            self.flush_armed = true;
            return true;
        }
        false
    }

    /// Whether a flush tick is currently armed.
    pub fn flush_armed(&self) -> bool {
        self.flush_armed
    }

    /// Emit a snapshot if the buffer grew since the last emission.
    /// Clears the armed flag either way.
    pub fn flush(&mut self) -> Option<Snapshot> {
        self.flush_armed = false;
        if self.closed {
            return None;
        }
        if self.content.len() == self.emitted_content_len
            && self.thinking.len() == self.emitted_thinking_len
        {
            return None;
        }
        self.emitted_content_len = self.content.len();
        self.emitted_thinking_len = self.thinking.len();
        Some(Snapshot {
            content: self.content.clone(),
            thinking: self.thinking.clone(),
        })
    }

    /// Force-emit the authoritative final snapshot and close the buffer.
    ///
    /// Called on the terminal `StreamEnd`; emitted regardless of pending
    /// flush state so the last observable snapshot always equals the true
    /// final content.
    pub fn finalize(&mut self, content: String, thinking: String) -> Snapshot {
        self.closed = true;
        self.flush_armed = false;
        self.content = content;
        self.thinking = thinking;
        self.emitted_content_len = self.content.len();
        self.emitted_thinking_len = self.thinking.len();
        Snapshot {
            content: self.content.clone(),
            thinking: self.thinking.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content(delta: &str) -> StreamEvent {
        StreamEvent::ContentDelta {
            delta: delta.to_string(),
        }
    }

    #[test]
    fn first_delta_arms_exactly_one_flush() {
        let mut agg = ResponseAggregator::new();
        assert!(agg.on_delta(&content("a")));
        assert!(!agg.on_delta(&content("b")));
        assert!(!agg.on_delta(&content("c")));
        assert!(agg.flush_armed());

        let snapshot = agg.flush().expect("buffer grew");
        assert_eq!(snapshot.content, "abc");
        assert!(!agg.flush_armed());

        // Next delta re-arms
        assert!(agg.on_delta(&content("d")));
    }

    #[test]
    fn flush_without_growth_emits_nothing() {
        let mut agg = ResponseAggregator::new();
        agg.on_delta(&content("x"));
        assert!(agg.flush().is_some());
        assert!(agg.flush().is_none());
    }

    #[test]
    fn finalize_overrides_pending_flush_with_authoritative_totals() {
        let mut agg = ResponseAggregator::new();
        agg.on_delta(&content("par"));
        assert!(agg.flush_armed());

        let final_snapshot = agg.finalize("partial plus rest".into(), "why".into());
        assert_eq!(final_snapshot.content, "partial plus rest");
        assert_eq!(final_snapshot.thinking, "why");
        assert!(!agg.flush_armed());

        // Closed buffer ignores stragglers
        assert!(!agg.on_delta(&content("late")));
        assert!(agg.flush().is_none());
    }

    #[test]
    fn content_and_thinking_accumulate_independently() {
        let mut agg = ResponseAggregator::new();
        agg.on_delta(&content("answer"));
        agg.on_delta(&StreamEvent::ThinkingDelta {
            delta: "because".into(),
        });
        let snapshot = agg.flush().unwrap();
        assert_eq!(snapshot.content, "answer");
        assert_eq!(snapshot.thinking, "because");
    }

    #[test]
    fn snapshot_lengths_are_monotonic_for_random_schedules() {
        use rand::Rng;
        let mut rng = rand::thread_rng();

        for _ in 0..50 {
            let mut agg = ResponseAggregator::new();
            let mut snapshots: Vec<Snapshot> = Vec::new();
            let mut expected = String::new();

            let deltas = rng.gen_range(1..=100);
            for _ in 0..deltas {
                let chunk: String = (0..rng.gen_range(0..=5)).map(|_| 'x').collect();
                expected.push_str(&chunk);
                agg.on_delta(&content(&chunk));
                // Random flush schedule: the tick fires whenever
                if rng.gen_bool(0.3)
                    && let Some(s) = agg.flush()
                {
                    snapshots.push(s);
                }
            }
            snapshots.push(agg.finalize(expected.clone(), String::new()));

            for pair in snapshots.windows(2) {
                assert!(pair[0].content.len() <= pair[1].content.len());
            }
            assert_eq!(snapshots.last().unwrap().content, expected);
        }
    }
}
