//! A deterministic stand-in for "run this after a delay". Time only moves
//! when the host calls [`Timeline::advance`], so a scheduled completion can be
//! cancelled at any point before it fires and tests never sleep.

use std::time::Duration;

use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerToken(u64);

#[derive(Debug)]
struct Scheduled<T> {
	token:    TimerToken,
	deadline: Duration,
	payload:  T,
}

#[derive(Debug)]
pub struct Timeline<T> {
	now:        Duration,
	next_token: u64,
	pending:    Vec<Scheduled<T>>,
}

impl<T> Default for Timeline<T> {
	fn default() -> Self { Self::new() }
}

impl<T> Timeline<T> {
	pub fn new() -> Self { Self { now: Duration::ZERO, next_token: 0, pending: Vec::new() } }

	pub fn now(&self) -> Duration { self.now }

	pub fn schedule(&mut self, after: Duration, payload: T) -> TimerToken {
		let token = TimerToken(self.next_token);
		self.next_token += 1;

		let deadline = self.now.saturating_add(after);
		debug!("Scheduling {:?} for {:?}", token, deadline);
		self.pending.push(Scheduled { token, deadline, payload });
		token
	}

	/// Returns the payload if the timer had not fired yet
	pub fn cancel(&mut self, token: TimerToken) -> Option<T> {
		let position = self.pending.iter().position(|s| s.token == token)?;
		debug!("Cancelling {:?}", token);
		Some(self.pending.remove(position).payload)
	}

	pub fn is_pending(&self, token: TimerToken) -> bool { self.pending.iter().any(|s| s.token == token) }

	pub fn has_pending(&self) -> bool { !self.pending.is_empty() }

	/// Time left until the earliest pending deadline
	pub fn until_next(&self) -> Option<Duration> {
		self.pending.iter().map(|s| s.deadline.saturating_sub(self.now)).min()
	}

	/// Moves the clock forward and hands back everything that came due,
	/// earliest deadline first (ties in scheduling order).
	pub fn advance(&mut self, elapsed: Duration) -> Vec<(TimerToken, T)> {
		self.now = self.now.saturating_add(elapsed);
		trace!("Timeline at {:?}", self.now);

		let now = self.now;
		let (mut due, waiting): (Vec<_>, Vec<_>) =
			std::mem::take(&mut self.pending).into_iter().partition(|s| s.deadline <= now);
		self.pending = waiting;

		due.sort_by_key(|s| (s.deadline, s.token));
		due.into_iter().map(|s| (s.token, s.payload)).collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const MS: Duration = Duration::from_millis(1);

	#[test]
	fn fires_only_once_deadline_passes() {
		let mut timeline = Timeline::new();
		let token = timeline.schedule(MS * 200, "slide");

		assert!(timeline.advance(MS * 199).is_empty());
		assert!(timeline.is_pending(token));
		assert_eq!(timeline.advance(MS), vec![(token, "slide")]);
		assert!(!timeline.has_pending());
	}

	#[test]
	fn cancelled_timers_never_fire() {
		let mut timeline = Timeline::new();
		let token = timeline.schedule(MS * 10, 1);
		assert_eq!(timeline.cancel(token), Some(1));
		assert_eq!(timeline.cancel(token), None);
		assert!(timeline.advance(MS * 50).is_empty());
	}

	#[test]
	fn clock_saturates_instead_of_overflowing() {
		let mut timeline = Timeline::new();
		timeline.advance(Duration::MAX);
		timeline.advance(Duration::MAX);
		assert_eq!(timeline.now(), Duration::MAX);

		let token = timeline.schedule(MS * 200, "late");
		assert_eq!(timeline.until_next(), Some(Duration::ZERO));
		assert_eq!(timeline.advance(Duration::ZERO), vec![(token, "late")]);
	}

	#[test]
	fn due_timers_come_back_in_deadline_order() {
		let mut timeline = Timeline::new();
		let late = timeline.schedule(MS * 30, "late");
		let early = timeline.schedule(MS * 10, "early");
		assert_eq!(timeline.until_next(), Some(MS * 10));
		assert_eq!(timeline.advance(MS * 40), vec![(early, "early"), (late, "late")]);
	}
}
