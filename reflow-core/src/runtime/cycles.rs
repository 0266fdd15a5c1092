//! One period of each control task
//!
//! Every body follows the same discipline: copy what it needs out of the
//! shared record, compute outside the lock, write back under the lock.
//! Lock waits are bounded by the deadline future the caller supplies;
//! when it wins the cycle is skipped and retried next period.

use core::future::Future;

use embassy_sync::blocking_mutex::raw::RawMutex;

use super::queue::{CommandQueue, PendingCommands};
use super::shared::{SharedConfig, SharedProcess};
use crate::control::{DualChannelPid, TimeProportioner};
use crate::controller::ProcessController;
use crate::safety::{SafetyMonitor, SafetyStatus};
use crate::state::process::is_plausible_reading;
use crate::state::{Channel, ReadingOutcome, SENSOR_FAULT_SENTINEL};
use crate::traits::{HeaterOutput, TemperatureSensor};

/// What happened to a cycle's write-back
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CycleOutcome {
    /// Result committed
    Completed,
    /// Lock not acquired in time, nothing written
    Skipped,
    /// Lifecycle changed concurrently, planned result discarded
    Superseded,
}

/// Lifecycle task body
///
/// Applies queued commands and the automatic transitions to a snapshot,
/// then commits only if no one else changed the lifecycle state in the
/// meantime. A concurrent safety fault therefore always wins.
///
/// Commands move from `commands` into `pending` and stay there until a plan
/// built from them is committed. A superseded or timed-out cycle replays
/// them against the next snapshot.
pub async fn lifecycle_cycle<M, const N: usize, D>(
    shared: &SharedProcess<M>,
    commands: &CommandQueue<M, N>,
    pending: &mut PendingCommands<N>,
    controller: &mut ProcessController,
    now_ms: u64,
    mut deadline: impl FnMut() -> D,
) -> CycleOutcome
where
    M: RawMutex,
    D: Future<Output = ()>,
{
    let Some(mut planned) = shared.snapshot_within(deadline()).await else {
        trace!("Lifecycle: process state busy, skipping");
        return CycleOutcome::Skipped;
    };
    let before = planned.state;

    while !pending.is_full() {
        let Some(command) = commands.take() else {
            break;
        };
        // Capacity checked above
        let _ = pending.push(command);
    }
    for command in pending.iter() {
        // Rejections are logged by the controller
        let _ = controller.apply_command(&mut planned, *command, now_ms);
    }
    controller.step(&mut planned, now_ms);

    let committed = shared
        .update_within(deadline(), |current| {
            if current.state != before {
                return false;
            }
            current.merge_lifecycle(&planned);
            true
        })
        .await;

    match committed {
        Some(true) => {
            pending.clear();
            CycleOutcome::Completed
        }
        Some(false) => {
            debug!(
                "Lifecycle: state changed concurrently, {} commands kept for retry",
                pending.len()
            );
            CycleOutcome::Superseded
        }
        None => {
            warn!(
                "Lifecycle: commit timed out, {} commands kept for retry",
                pending.len()
            );
            CycleOutcome::Skipped
        }
    }
}

/// PID task body
///
/// Gains come from `config` fresh every cycle. The power write is guarded
/// by the lifecycle state at commit time, not at snapshot time.
pub async fn pid_cycle<M, D>(
    shared: &SharedProcess<M>,
    config: &SharedConfig<M>,
    pid: &mut DualChannelPid,
    mut deadline: impl FnMut() -> D,
) -> CycleOutcome
where
    M: RawMutex,
    D: Future<Output = ()>,
{
    let Some(snapshot) = shared.snapshot_within(deadline()).await else {
        trace!("PID: process state busy, skipping");
        return CycleOutcome::Skipped;
    };

    let config = config.get();
    let powers = pid.cycle(&config, &snapshot);

    let committed = shared
        .update_within(deadline(), |current| {
            if current.state.is_active_control() {
                current.power_ch1 = powers[0];
                current.power_ch2 = powers[1];
            } else {
                current.zero_power();
            }
        })
        .await;

    match committed {
        Some(()) => CycleOutcome::Completed,
        None => {
            trace!("PID: commit timed out");
            CycleOutcome::Skipped
        }
    }
}

/// Safety task body
///
/// Never waits for the lock. Returns `None` when the check was skipped.
pub fn safety_cycle<M: RawMutex>(
    shared: &SharedProcess<M>,
    monitor: &mut SafetyMonitor,
) -> Option<SafetyStatus> {
    let status = shared.try_update(|process| monitor.enforce(process));
    if status.is_none() {
        monitor.record_skip();
    }
    status
}

/// SSR output task body
///
/// Lines are only driven while the lifecycle state grants heater
/// authority. When the record cannot be read in time both lines go off.
pub async fn output_cycle<M, D, H1, H2>(
    shared: &SharedProcess<M>,
    proportioner: &mut TimeProportioner,
    ssr1: &mut H1,
    ssr2: &mut H2,
    deadline: D,
) -> CycleOutcome
where
    M: RawMutex,
    D: Future<Output = ()>,
    H1: HeaterOutput,
    H2: HeaterOutput,
{
    let snapshot = shared.snapshot_within(deadline).await;

    let powers = match snapshot {
        Some(s) if s.state.is_active_control() => s.powers(),
        _ => [0.0, 0.0],
    };
    let [on1, on2] = proportioner.tick(powers);
    ssr1.set_on(on1);
    ssr2.set_on(on2);

    match snapshot {
        Some(_) => CycleOutcome::Completed,
        None => CycleOutcome::Skipped,
    }
}

/// Sensor task body for one channel
///
/// The bus read happens before the lock is touched. Failed reads and
/// sentinel values leave the stored temperature unchanged.
pub async fn sensor_cycle<M, D, S>(
    shared: &SharedProcess<M>,
    config: &SharedConfig<M>,
    channel: Channel,
    sensor: &mut S,
    deadline: D,
) -> ReadingOutcome
where
    M: RawMutex,
    D: Future<Output = ()>,
    S: TemperatureSensor,
{
    let raw = match sensor.read_celsius().await {
        Ok(celsius) => celsius,
        Err(e) => {
            debug!("Sensor {} read failed: {}", channel, e);
            SENSOR_FAULT_SENTINEL
        }
    };

    if !is_plausible_reading(raw) {
        return ReadingOutcome::Rejected;
    }

    let offset = config.get().offset(channel);
    shared
        .update_within(deadline, |process| process.ingest(channel, raw, offset))
        .await
        .unwrap_or(ReadingOutcome::Skipped)
}
