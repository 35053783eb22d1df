//! Bus transport workers
//!
//! Each physical bus gets one [`BusContext`] and one [`BusWorker`]. Drivers
//! submit frames to the context's bounded queue; the worker takes them in
//! order, programs the panel window, streams the pixels through the
//! [`LcdBus`] and drops the frame, which returns it to its pool.
//!
//! DMA completion is reported from interrupt context through
//! [`BusContext::on_transfer_complete`]. Every transfer waits for it with a
//! bounded timeout.
//!
//! ```text
//! driver.flush ──▶ queue (Q deep) ──▶ worker ──▶ LcdBus ──▶ DMA
//!                                        ▲                   │
//!                                        └── done signal ◀───┘
//! ```

pub mod window;
pub mod worker;

pub use window::{AddressMode, WindowCache};
pub use worker::BusWorker;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::mutex::{Mutex, MutexGuard};
use embassy_sync::signal::Signal;
use embassy_time::{with_timeout, Duration};
use portable_atomic::{AtomicBool, AtomicU8, Ordering};

use crate::buffer::FrameBuffer;
use crate::config::BusConfig;
use crate::error::DisplayError;
use crate::traits::{LcdBus, Transfer};

/// Queue depth used when none is given
pub const DEFAULT_QUEUE_DEPTH: usize = 4;

/// Queue message for a bus worker
#[derive(Debug)]
pub enum BusMessage {
    /// Send this frame
    Frame(FrameBuffer),
    /// Release everything queued and stop
    Exit,
}

/// Lifecycle of a bus worker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum WorkerState {
    /// No worker attached
    Stopped = 0,
    /// Sending frames
    Running = 1,
    /// Releasing queued frames after an exit request
    Draining = 2,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Running,
            2 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

/// Shared state for one physical bus
pub struct BusContext<M: RawMutex, B, const Q: usize = DEFAULT_QUEUE_DEPTH> {
    id: u8,
    address: AddressMode,
    config: BusConfig,
    bus: Mutex<M, B>,
    pub(crate) queue: Channel<M, BusMessage, Q>,
    done: Signal<M, ()>,
    exit_ack: Signal<M, ()>,
    state: AtomicU8,
    fault: AtomicBool,
    closed: AtomicBool,
}

impl<M: RawMutex, B: LcdBus, const Q: usize> BusContext<M, B, Q> {
    /// Wrap a bus transport
    pub const fn new(id: u8, bus: B, address: AddressMode, config: BusConfig) -> Self {
        Self {
            id,
            address,
            config,
            bus: Mutex::new(bus),
            queue: Channel::new(),
            done: Signal::new(),
            exit_ack: Signal::new(),
            state: AtomicU8::new(WorkerState::Stopped as u8),
            fault: AtomicBool::new(false),
            closed: AtomicBool::new(false),
        }
    }

    /// Bus number, used in log messages
    pub fn id(&self) -> u8 {
        self.id
    }

    pub fn address(&self) -> AddressMode {
        self.address
    }

    pub fn config(&self) -> BusConfig {
        self.config
    }

    pub fn state(&self) -> WorkerState {
        WorkerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub(crate) fn set_state(&self, state: WorkerState) {
        self.state.store(state as u8, Ordering::Release);
    }

    pub(crate) fn try_start(&self) -> bool {
        self.state
            .compare_exchange(
                WorkerState::Stopped as u8,
                WorkerState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }

    /// Set once [`shutdown`](Self::shutdown) has started
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Messages waiting in the queue
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Report that the transfer in progress finished
    ///
    /// Call from the DMA transfer-complete interrupt.
    pub fn on_transfer_complete(&self) {
        self.done.signal(());
    }

    /// Clear and return the latched timeout fault
    pub fn take_fault(&self) -> bool {
        self.fault.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn latch_fault(&self) {
        self.fault.store(true, Ordering::Release);
    }

    /// Exclusive access to the transport, e.g. for panel initialization
    pub async fn lock_bus(&self) -> MutexGuard<'_, M, B> {
        self.bus.lock().await
    }

    /// Queue a frame, waiting while the queue is full
    ///
    /// If an earlier transfer on this bus timed out under
    /// [`TimeoutPolicy::Report`], the frame is released instead and
    /// `BusTimeout` returned once.
    ///
    /// Once the bus is shut down the frame is released and `BusClosed`
    /// returned.
    ///
    /// [`TimeoutPolicy::Report`]: crate::config::TimeoutPolicy::Report
    pub async fn submit(&self, frame: FrameBuffer) -> Result<(), DisplayError> {
        if self.is_closed() {
            warn!("bus {}: closed, releasing slot {}", self.id, frame.slot());
            drop(frame);
            return Err(DisplayError::BusClosed);
        }
        if self.take_fault() {
            warn!("bus {}: reporting timed out transfer", self.id);
            drop(frame);
            return Err(DisplayError::BusTimeout);
        }
        self.queue.send(BusMessage::Frame(frame)).await;

        // Shut down while this send was waiting for room
        if self.is_closed() && self.state() == WorkerState::Stopped {
            self.release_queued();
            return Err(DisplayError::BusClosed);
        }
        Ok(())
    }

    /// Stop the worker, releasing every queued frame unsent
    ///
    /// Returns once the worker has acknowledged. Without a running worker
    /// the queue is drained directly. The context stays closed: later
    /// submits fail with `BusClosed` and no worker starts on it again.
    pub async fn shutdown(&self) {
        self.closed.store(true, Ordering::Release);
        if self.state() == WorkerState::Stopped {
            let released = self.release_queued();
            debug!("bus {}: no worker, released {} frames", self.id, released);
            return;
        }

        self.exit_ack.reset();
        self.queue.send(BusMessage::Exit).await;
        self.exit_ack.wait().await;
        info!("bus {}: shut down", self.id);
    }

    /// Drop every queued frame, returning how many there were
    pub(crate) fn release_queued(&self) -> usize {
        let mut released = 0;
        while let Ok(message) = self.queue.try_receive() {
            if let BusMessage::Frame(frame) = message {
                drop(frame);
                released += 1;
            }
        }
        released
    }

    pub(crate) fn acknowledge_exit(&self) {
        self.exit_ack.signal(());
    }

    /// Start one transfer and wait for it to finish
    ///
    /// `start` kicks the transfer off on `bus`. A pending transfer is
    /// awaited for at most the configured transfer timeout.
    /// [`LcdBus::complete`] runs afterwards in every case.
    pub async fn transact(
        &self,
        bus: &mut B,
        start: impl FnOnce(&mut B) -> Result<Transfer, DisplayError>,
    ) -> Result<(), DisplayError> {
        self.done.reset();
        let result = match start(bus) {
            Ok(Transfer::Done) => Ok(()),
            Ok(Transfer::Pending) => with_timeout(self.transfer_timeout(), self.done.wait())
                .await
                .map_err(|_| DisplayError::BusTimeout),
            Err(e) => Err(e),
        };
        bus.complete();
        result
    }

    fn transfer_timeout(&self) -> Duration {
        Duration::from_millis(self.config.transfer_timeout_ms as u64)
    }
}
