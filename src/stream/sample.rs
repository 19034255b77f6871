//! Latest-wins sampling of snapshot streams

use futures::Stream;
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};

use crate::types::{FrameRate, RaceSnapshot};

/// Items carrying the simulation tick they were produced on.
pub trait Ticked {
    fn tick(&self) -> u64;
}

impl Ticked for RaceSnapshot {
    fn tick(&self) -> u64 {
        self.tick
    }
}

impl<T: Ticked + ?Sized> Ticked for Arc<T> {
    fn tick(&self) -> u64 {
        (**self).tick()
    }
}

/// Extension trait adding [`Sample`] to snapshot streams.
pub trait SampleExt: Stream {
    /// Emit at most once per `period`, always the newest item, never the same
    /// tick twice in a row.
    fn sample(self, period: Duration) -> Sample<Self>
    where
        Self: Sized,
        Self::Item: Ticked,
    {
        Sample::new(self, period)
    }

    /// Drop consecutive items from the same tick without rate limiting.
    fn dedup_ticks(self) -> Sample<Self>
    where
        Self: Sized,
        Self::Item: Ticked,
    {
        Sample::new(self, Duration::ZERO)
    }

    /// Sample at a consumer's [`FrameRate`], given the wall-clock period between
    /// published ticks (`None` when the producer is unpaced).
    fn at_rate(self, rate: FrameRate, tick_period: Option<Duration>) -> Sample<Self>
    where
        Self: Sized,
        Self::Item: Ticked,
    {
        Sample::new(self, sample_period(rate, tick_period))
    }
}

/// Wall-clock sampling period for `rate`; zero when every tick can be delivered.
fn sample_period(rate: FrameRate, tick_period: Option<Duration>) -> Duration {
    let hz = match rate {
        FrameRate::Max(hz) if hz > 0 => hz,
        _ => return Duration::ZERO,
    };
    let period = Duration::from_secs_f64(1.0 / f64::from(hz));
    match tick_period {
        Some(tick) if period <= tick => Duration::ZERO,
        _ => period,
    }
}

impl<T: Stream> SampleExt for T {}

pin_project! {
    /// Stream combinator returned by [`SampleExt::sample`]
    pub struct Sample<S: Stream> {
        #[pin]
        stream: S,
        interval: Option<Interval>,
        pending: Option<S::Item>,
        last_tick: Option<u64>,
        done: bool,
    }
}

impl<S: Stream> Sample<S>
where
    S::Item: Ticked,
{
    pub fn new(stream: S, period: Duration) -> Self {
        let interval = (!period.is_zero()).then(|| {
            let mut interval = interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });
        Self { stream, interval, pending: None, last_tick: None, done: false }
    }
}

impl<S: Stream> Stream for Sample<S>
where
    S::Item: Ticked,
{
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Drain whatever is ready, keeping only the newest unseen tick
        while !*this.done {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    if *this.last_tick != Some(item.tick()) {
                        *this.pending = Some(item);
                    }
                }
                Poll::Ready(None) => *this.done = true,
                Poll::Pending => break,
            }
        }

        if this.pending.is_none() {
            return if *this.done { Poll::Ready(None) } else { Poll::Pending };
        }

        // A finished source flushes its last item without waiting for the period
        if !*this.done
            && let Some(interval) = this.interval.as_mut()
            && interval.poll_tick(cx).is_pending()
        {
            return Poll::Pending;
        }

        let item = this.pending.take();
        *this.last_tick = item.as_ref().map(Ticked::tick);
        Poll::Ready(item)
    }
}
