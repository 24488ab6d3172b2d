//! Cancellation and deadlines for async work owned by a mounted view.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::{Rc, Weak};
use std::time::Duration;

use futures::future::{AbortHandle, Abortable, Aborted, Either, select};
use futures::pin_mut;
use log::{debug, warn};

use crate::error::GraphError;

type Handles = RefCell<HashMap<u64, AbortHandle>>;

/// Tracks the async calls started by one view instance so they can all be
/// abandoned on teardown. A call stops being tracked once its future
/// finishes or is dropped.
#[derive(Debug, Default)]
pub struct CancelScope {
	handles: Rc<Handles>,
	next_id: Cell<u64>,
	disposed: Cell<bool>,
}

/// Untracks one guarded call when dropped.
struct Tracked {
	id: u64,
	handles: Weak<Handles>,
}

impl Drop for Tracked {
	fn drop(&mut self) {
		if let Some(handles) = self.handles.upgrade() {
			if let Ok(mut handles) = handles.try_borrow_mut() {
				handles.remove(&self.id);
			}
		}
	}
}

impl CancelScope {
	/// Creates an empty, live scope.
	pub fn new() -> Self {
		Self::default()
	}

	/// Wraps `fut` so it resolves to `Err(Aborted)` once the scope is
	/// disposed. Futures guarded after disposal are aborted immediately.
	pub fn guard<F: Future>(&self, fut: F) -> impl Future<Output = Result<F::Output, Aborted>> + use<F> {
		let (handle, registration) = AbortHandle::new_pair();
		let tracked = if self.disposed.get() {
			handle.abort();
			None
		} else {
			let id = self.next_id.get();
			self.next_id.set(id.wrapping_add(1));
			self.handles.borrow_mut().insert(id, handle);
			Some(Tracked {
				id,
				handles: Rc::downgrade(&self.handles),
			})
		};
		let fut = Abortable::new(fut, registration);
		async move {
			let _tracked = tracked;
			fut.await
		}
	}

	/// Number of guarded calls still outstanding.
	pub fn outstanding(&self) -> usize {
		self.handles.borrow().len()
	}

	/// Whether [`CancelScope::dispose`] has run.
	pub fn is_disposed(&self) -> bool {
		self.disposed.get()
	}

	/// Aborts every outstanding guarded future.
	pub fn dispose(&self) {
		if self.disposed.replace(true) {
			return;
		}
		let handles = std::mem::take(&mut *self.handles.borrow_mut());
		debug!("cancel scope disposed, aborting {} calls", handles.len());
		for handle in handles.into_values() {
			handle.abort();
		}
	}
}

/// Why a snapshot request is being issued.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
	/// The inputs changed; any request still in flight is stale.
	Replace,
	/// Periodic refresh; skipped while a request is in flight.
	Refresh,
}

/// Admits at most one snapshot request at a time, so the outstanding
/// request always gets to report its outcome (including a timeout).
#[derive(Debug, Default)]
pub struct RequestSlot {
	next_ticket: u64,
	in_flight: Option<(u64, AbortHandle)>,
}

impl RequestSlot {
	/// Admits `fut` under `trigger`. Returns its ticket and the abortable
	/// future, or `None` when a refresh finds a request still running.
	/// A replacement aborts the request it supersedes.
	pub fn start<F: Future>(&mut self, trigger: Trigger, fut: F) -> Option<(u64, Abortable<F>)> {
		if let Some((ticket, handle)) = &self.in_flight {
			match trigger {
				Trigger::Refresh => {
					debug!("refresh skipped, request {ticket} still in flight");
					return None;
				}
				Trigger::Replace => {
					debug!("request {ticket} superseded");
					handle.abort();
				}
			}
		}
		self.next_ticket += 1;
		let ticket = self.next_ticket;
		let (handle, registration) = AbortHandle::new_pair();
		self.in_flight = Some((ticket, handle));
		Some((ticket, Abortable::new(fut, registration)))
	}

	/// Marks `ticket` finished. Returns whether it was still the current
	/// request and may publish its outcome.
	pub fn finish(&mut self, ticket: u64) -> bool {
		match &self.in_flight {
			Some((current, _)) if *current == ticket => {
				self.in_flight = None;
				true
			}
			_ => false,
		}
	}

	/// Whether a request is outstanding.
	pub fn is_busy(&self) -> bool {
		self.in_flight.is_some()
	}
}

/// Races `fut` against `timer`. When the timer fires first the pending work
/// is dropped and `Timeout(limit)` is returned.
pub async fn with_timeout<T, F, S>(fut: F, timer: S, limit: Duration) -> Result<T, GraphError>
where
	F: Future<Output = T>,
	S: Future<Output = ()>,
{
	pin_mut!(fut);
	pin_mut!(timer);
	match select(fut, timer).await {
		Either::Left((value, _)) => Ok(value),
		Either::Right(((), _)) => {
			warn!("operation gave no result within {limit:?}");
			Err(GraphError::Timeout(limit))
		}
	}
}

/// Flattens a guarded, deadline-bound fetch. `None` means the owning view
/// was torn down and the result must be ignored.
pub fn settle<T>(
	outcome: Result<Result<Result<T, GraphError>, GraphError>, Aborted>,
) -> Option<Result<T, GraphError>> {
	match outcome {
		Err(Aborted) => None,
		Ok(inner) => Some(inner.and_then(|r| r)),
	}
}
