//! Shared containers handed to every periodic task
//!
//! The process record sits behind a single async mutex. Acquisition is
//! always bounded: callers supply a deadline future (a timer on target,
//! an already-ready future in tests) and skip the cycle when it wins.
//! Guards never escape these methods, so the lock is only held for a
//! copy-in or copy-out.

use core::cell::Cell;
use core::future::Future;

use embassy_futures::select::{select, Either};
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;

use crate::config::SystemConfig;
use crate::state::ProcessState;

/// The single process record
pub struct SharedProcess<M: RawMutex> {
    inner: Mutex<M, ProcessState>,
}

impl<M: RawMutex> Default for SharedProcess<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex> SharedProcess<M> {
    /// Power-on record (INIT, all zero)
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(ProcessState::new()),
        }
    }

    /// Copy the record if the lock is free right now
    pub fn try_snapshot(&self) -> Option<ProcessState> {
        self.inner.try_lock().ok().map(|guard| *guard)
    }

    /// Modify the record if the lock is free right now
    pub fn try_update<R>(&self, f: impl FnOnce(&mut ProcessState) -> R) -> Option<R> {
        let mut guard = self.inner.try_lock().ok()?;
        Some(f(&mut guard))
    }

    /// Copy the record, giving up when `deadline` completes first
    pub async fn snapshot_within<D>(&self, deadline: D) -> Option<ProcessState>
    where
        D: Future<Output = ()>,
    {
        match select(self.inner.lock(), deadline).await {
            Either::First(guard) => Some(*guard),
            Either::Second(()) => None,
        }
    }

    /// Modify the record, giving up when `deadline` completes first
    pub async fn update_within<D, R>(
        &self,
        deadline: D,
        f: impl FnOnce(&mut ProcessState) -> R,
    ) -> Option<R>
    where
        D: Future<Output = ()>,
    {
        match select(self.inner.lock(), deadline).await {
            Either::First(mut guard) => Some(f(&mut guard)),
            Either::Second(()) => None,
        }
    }

    /// Hold the lock to simulate a slow holder
    #[cfg(test)]
    pub(crate) fn hold(&self) -> embassy_sync::mutex::MutexGuard<'_, M, ProcessState> {
        self.inner.try_lock().unwrap()
    }
}

/// Live system configuration
///
/// Read by the PID task at the start of every cycle so edits apply
/// without a restart.
pub struct SharedConfig<M: RawMutex> {
    inner: BlockingMutex<M, Cell<SystemConfig>>,
}

impl<M: RawMutex> Default for SharedConfig<M> {
    fn default() -> Self {
        Self::new(SystemConfig::new())
    }
}

impl<M: RawMutex> SharedConfig<M> {
    /// Create a cell holding `config`
    pub const fn new(config: SystemConfig) -> Self {
        Self {
            inner: BlockingMutex::new(Cell::new(config)),
        }
    }

    /// Current configuration
    pub fn get(&self) -> SystemConfig {
        self.inner.lock(|cell| cell.get())
    }

    /// Replace the configuration
    pub fn set(&self, config: SystemConfig) {
        self.inner.lock(|cell| cell.set(config));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PidGains;
    use crate::state::OvenState;
    use core::future::{pending, ready};
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;

    #[test]
    fn test_snapshot_and_update() {
        let shared: SharedProcess<NoopRawMutex> = SharedProcess::new();

        let snap = block_on(shared.snapshot_within(pending())).unwrap();
        assert_eq!(snap.state, OvenState::Init);

        let result = block_on(shared.update_within(pending(), |p| {
            p.state = OvenState::Idle;
            p.target = 42.0;
            7
        }));
        assert_eq!(result, Some(7));

        let snap = shared.try_snapshot().unwrap();
        assert_eq!(snap.state, OvenState::Idle);
        assert_eq!(snap.target, 42.0);
    }

    #[test]
    fn test_contention_times_out() {
        let shared: SharedProcess<NoopRawMutex> = SharedProcess::new();
        let _held = shared.hold();

        assert!(block_on(shared.snapshot_within(ready(()))).is_none());
        assert!(block_on(shared.update_within(ready(()), |p| p.target = 1.0)).is_none());
        assert!(shared.try_snapshot().is_none());
        assert!(shared.try_update(|p| p.target = 1.0).is_none());
    }

    #[test]
    fn test_free_lock_wins_over_ready_deadline() {
        let shared: SharedProcess<NoopRawMutex> = SharedProcess::new();
        assert!(block_on(shared.snapshot_within(ready(()))).is_some());
    }

    #[test]
    fn test_config_cell() {
        let config: SharedConfig<NoopRawMutex> = SharedConfig::default();
        assert_eq!(config.get(), SystemConfig::new());

        let mut edited = config.get();
        edited.ssr1 = PidGains::new(8.0, 0.1, 20.0);
        edited.ssr2_present = true;
        config.set(edited);

        assert_eq!(config.get(), edited);
    }
}
