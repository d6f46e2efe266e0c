//! Cooperative timer queue on a virtual clock.
//!
//! Delayed callbacks (slider autoplay, mostly) are queued per thread against
//! a virtual `now`. Nothing fires on its own: [`advance`] moves the clock and
//! runs every callback that came due, in deadline order, and the async
//! drivers [`run_until_idle`] / [`run_for`] do the same while sleeping on
//! `tokio::time` between deadlines.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::time::Duration;

type Callback = Box<dyn FnOnce()>;

/// Handle returned by [`set_timeout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Default)]
struct Timers {
    now: Duration,
    next_seq: u64,
    queue: BTreeMap<(Duration, u64), Callback>,
}

thread_local! {
    static TIMERS: RefCell<Timers> = RefCell::new(Timers::default());
}

/// Run `callback` once `delay` has elapsed on the virtual clock.
pub fn set_timeout(delay: Duration, callback: impl FnOnce() + 'static) -> TimerId {
    TIMERS.with(|timers| {
        let mut timers = timers.borrow_mut();
        timers.next_seq += 1;
        let seq = timers.next_seq;
        let deadline = timers.now + delay;
        timers.queue.insert((deadline, seq), Box::new(callback));
        TimerId(seq)
    })
}

/// Cancel a pending timer. Returns whether it was still pending.
pub fn clear_timeout(id: TimerId) -> bool {
    TIMERS.with(|timers| {
        let mut timers = timers.borrow_mut();
        let key = timers.queue.keys().find(|(_, seq)| *seq == id.0).copied();
        key.and_then(|key| timers.queue.remove(&key)).is_some()
    })
}

/// Current virtual time since the last reset.
pub fn now() -> Duration {
    TIMERS.with(|timers| timers.borrow().now)
}

/// Number of pending timers.
pub fn pending() -> usize {
    TIMERS.with(|timers| timers.borrow().queue.len())
}

/// Deadline of the earliest pending timer.
pub fn next_deadline() -> Option<Duration> {
    TIMERS.with(|timers| timers.borrow().queue.keys().next().map(|(at, _)| *at))
}

/// Move the clock forward by `by`, firing every timer that comes due.
///
/// Callbacks scheduled while advancing fire in the same call if their
/// deadline falls inside the window. Returns how many callbacks ran.
pub fn advance(by: Duration) -> usize {
    let target = now() + by;
    let mut fired = 0;
    loop {
        let due = TIMERS.with(|timers| {
            let mut timers = timers.borrow_mut();
            let entry = timers.queue.first_entry()?;
            if entry.key().0 > target {
                return None;
            }
            let ((deadline, _), callback) = entry.remove_entry();
            timers.now = deadline;
            Some(callback)
        });
        let Some(callback) = due else {
            break;
        };
        callback();
        fired += 1;
    }
    TIMERS.with(|timers| timers.borrow_mut().now = target);
    if fired > 0 {
        tracing::trace!(fired, now = ?target, "timers advanced");
    }
    fired
}

/// Drive the queue until no timer is pending, sleeping on the tokio clock
/// between deadlines.
///
/// Never returns while something keeps rescheduling itself (an autoplaying
/// slider); use [`run_for`] there.
pub async fn run_until_idle() {
    while let Some(deadline) = next_deadline() {
        let wait = deadline.saturating_sub(now());
        tokio::time::sleep(wait).await;
        advance(wait);
    }
}

/// Drive the queue for `duration` of clock time.
pub async fn run_for(duration: Duration) {
    let target = now() + duration;
    loop {
        let step = match next_deadline() {
            Some(deadline) if deadline <= target => deadline.saturating_sub(now()),
            _ => target.saturating_sub(now()),
        };
        tokio::time::sleep(step).await;
        advance(step);
        if now() >= target {
            break;
        }
    }
}

/// Drop every pending timer and rewind the clock.
pub fn reset_timers() {
    let dropped = TIMERS.with(|timers| std::mem::take(&mut *timers.borrow_mut()));
    drop(dropped);
}
