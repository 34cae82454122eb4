//! Repeating keepalive task.
//!
//! [`Keepalive`] owns at most one background task. Whether it is armed is
//! derived from the task handle itself, so a task that ended on its own is
//! never reported as running.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Outcome of one keepalive tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
	Continue,
	Stop,
}

/// Handle to the keepalive task. Dropping it stops the task.
#[derive(Debug, Default)]
pub struct Keepalive {
	task: Option<JoinHandle<()>>,
}

impl Keepalive {
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns true while the task is running.
	pub fn is_armed(&self) -> bool {
		self.task.as_ref().is_some_and(|task| !task.is_finished())
	}

	/// Spawns a task calling `tick` every `period`, first after one period.
	///
	/// Does nothing and returns false if a task is already armed. The task
	/// ends when `tick` returns [`Tick::Stop`].
	///
	/// Must be called from within a Tokio runtime.
	pub fn start<F>(&mut self, period: Duration, mut tick: F) -> bool
	where
		F: FnMut() -> Tick + Send + 'static,
	{
		if self.is_armed() {
			return false;
		}

		let first = Instant::now() + period;
		self.task = Some(tokio::spawn(async move {
			let mut interval = tokio::time::interval_at(first, period);
			interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
			loop {
				interval.tick().await;
				if tick() == Tick::Stop {
					tracing::debug!("keepalive stopped itself");
					break;
				}
			}
		}));
		true
	}

	/// Stops the task. Returns true if it was armed.
	pub fn stop(&mut self) -> bool {
		match self.task.take() {
			Some(task) => {
				let armed = !task.is_finished();
				task.abort();
				armed
			}
			None => false,
		}
	}
}

impl Drop for Keepalive {
	fn drop(&mut self) {
		if let Some(task) = self.task.take() {
			task.abort();
		}
	}
}
