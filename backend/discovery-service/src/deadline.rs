//! Per-computation deadline threaded through every store read.
//!
//! The engine performs no writes, so aborting mid-computation can never leave
//! inconsistent state; a caller that sets a deadline simply gets
//! `ServiceError::DeadlineExceeded` instead of a partial result set.

use crate::error::{ServiceError, ServiceResult};
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// No deadline; computations run to completion.
    pub fn none() -> Self {
        Self(None)
    }

    /// Deadline `timeout` from now.
    pub fn after(timeout: Duration) -> Self {
        Self(Some(Instant::now() + timeout))
    }

    /// Deadline at an absolute instant.
    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn is_expired(&self) -> bool {
        matches!(self.0, Some(at) if Instant::now() >= at)
    }

    /// Checked before each store read; the whole computation aborts once the
    /// deadline has passed.
    pub fn check(&self) -> ServiceResult<()> {
        if self.is_expired() {
            Err(ServiceError::DeadlineExceeded)
        } else {
            Ok(())
        }
    }
}
