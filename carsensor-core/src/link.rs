//! Unbuffered handoff between loops
//!
//! embassy-sync channels always buffer at least one value. [`Rendezvous`]
//! adds an acknowledgement so `send` only completes once a receiver has
//! taken the value, coupling the sender's cadence to the receiver.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

/// Strict rendezvous for one value at a time
pub struct Rendezvous<M: RawMutex, T> {
    slot: Channel<M, T, 1>,
    taken: Signal<M, ()>,
}

impl<M: RawMutex, T> Rendezvous<M, T> {
    pub const fn new() -> Self {
        Self {
            slot: Channel::new(),
            taken: Signal::new(),
        }
    }

    /// Hand `value` over, waiting until a receiver has accepted it
    pub async fn send(&self, value: T) {
        self.taken.reset();
        self.slot.send(value).await;
        self.taken.wait().await;
    }

    /// Accept the next value
    pub async fn receive(&self) -> T {
        let value = self.slot.receive().await;
        self.taken.signal(());
        value
    }

    /// Accept a value if a sender is waiting
    pub fn try_receive(&self) -> Option<T> {
        let value = self.slot.try_receive().ok()?;
        self.taken.signal(());
        Some(value)
    }
}

impl<M: RawMutex, T> Default for Rendezvous<M, T> {
    fn default() -> Self {
        Self::new()
    }
}
