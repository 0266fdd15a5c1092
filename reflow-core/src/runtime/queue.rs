//! Bounded command queue
//!
//! Producers (button/encoder handlers, UI) post without blocking. When the
//! queue is full the new command is dropped and counted; a missed input is
//! recoverable, a stalled producer is not.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::channel::Channel;

use crate::state::Command;

/// Queue depth used by the firmware
pub const COMMAND_QUEUE_DEPTH: usize = 10;

/// Commands taken off the queue but not yet committed
///
/// Owned by the lifecycle task and only cleared once a plan built from them
/// lands in the shared record.
pub type PendingCommands<const N: usize> = heapless::Vec<Command, N>;

/// FIFO of lifecycle commands with a drop counter
pub struct CommandQueue<M: RawMutex, const N: usize> {
    channel: Channel<M, Command, N>,
    dropped: BlockingMutex<M, Cell<u32>>,
}

impl<M: RawMutex, const N: usize> Default for CommandQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> CommandQueue<M, N> {
    /// Create an empty queue
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: BlockingMutex::new(Cell::new(0)),
        }
    }

    /// Enqueue a command without waiting
    ///
    /// Returns `false` when the queue was full and the command was dropped.
    pub fn post(&self, command: Command) -> bool {
        match self.channel.try_send(command) {
            Ok(()) => true,
            Err(_) => {
                let total = self.dropped.lock(|count| {
                    let total = count.get().saturating_add(1);
                    count.set(total);
                    total
                });
                warn!("Command queue full, dropping {} ({} dropped)", command, total);
                false
            }
        }
    }

    /// Dequeue the oldest command, if any
    pub fn take(&self) -> Option<Command> {
        self.channel.try_receive().ok()
    }

    /// Commands dropped since start
    pub fn dropped(&self) -> u32 {
        self.dropped.lock(|count| count.get())
    }

    /// Commands waiting
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    /// Check if no commands are waiting
    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }
}
