//! Single-flight guard for sync runs.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// At most one [`RunLease`] exists per lock at any time.
///
/// Cloning shares the underlying lock.
#[derive(Debug, Clone, Default)]
pub struct RunLock {
  inner: Arc<Mutex<()>>,
}

/// Proof that the holder owns the current run. Released on drop.
#[derive(Debug)]
pub struct RunLease {
  _guard: OwnedMutexGuard<()>,
}

impl RunLock {
  pub fn new() -> Self { Self::default() }

  /// Take the lease, or `None` if a run is already active.
  pub fn try_acquire(&self) -> Option<RunLease> {
    self
      .inner
      .clone()
      .try_lock_owned()
      .ok()
      .map(|guard| RunLease { _guard: guard })
  }

  pub fn is_held(&self) -> bool { self.inner.try_lock().is_err() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn second_acquire_fails_until_release() {
    let lock = RunLock::new();
    let lease = lock.try_acquire().expect("first lease");
    assert!(lock.is_held());
    assert!(lock.clone().try_acquire().is_none());

    drop(lease);
    assert!(!lock.is_held());
    assert!(lock.try_acquire().is_some());
  }
}
