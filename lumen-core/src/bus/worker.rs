//! Bus worker loop
//!
//! On target, wrap [`BusWorker::run`] in an embassy task per bus:
//!
//! ```ignore
//! #[embassy_executor::task]
//! async fn lcd_bus(ctx: &'static LcdContext) {
//!     BusWorker::new(ctx).run().await
//! }
//! ```

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{with_timeout, Duration};

use super::window::WindowCache;
use super::{BusContext, BusMessage, WorkerState};
use crate::buffer::FrameBuffer;
use crate::config::{RefreshMode, TimeoutPolicy};
use crate::error::DisplayError;
use crate::traits::LcdBus;

/// Drains one [`BusContext`] onto its bus
pub struct BusWorker<'c, M: RawMutex, B: LcdBus, const Q: usize> {
    ctx: &'c BusContext<M, B, Q>,
    window: WindowCache,
    /// Frame currently shown by a periodically refreshed panel
    displayed: Option<FrameBuffer>,
}

impl<'c, M: RawMutex, B: LcdBus, const Q: usize> BusWorker<'c, M, B, Q> {
    pub fn new(ctx: &'c BusContext<M, B, Q>) -> Self {
        Self {
            ctx,
            window: WindowCache::default(),
            displayed: None,
        }
    }

    /// Process frames until an exit request, then release what is left
    ///
    /// Returns immediately if another worker already owns the context or
    /// the context has been shut down.
    pub async fn run(mut self) {
        let ctx = self.ctx;
        if !ctx.try_start() {
            warn!("bus {}: worker already running", ctx.id());
            return;
        }
        if ctx.is_closed() {
            warn!("bus {}: closed before the worker started", ctx.id());
            self.drain();
            return;
        }
        info!("bus {}: worker running", ctx.id());

        match ctx.config().refresh {
            RefreshMode::OnDemand => self.run_on_demand().await,
            RefreshMode::Periodic { period_ms } => {
                self.run_periodic(Duration::from_millis(period_ms as u64)).await
            }
        }

        self.drain();
    }

    async fn run_on_demand(&mut self) {
        loop {
            match self.ctx.queue.receive().await {
                BusMessage::Frame(frame) => {
                    self.send(&frame).await;
                    drop(frame);
                }
                BusMessage::Exit => return,
            }
        }
    }

    async fn run_periodic(&mut self, period: Duration) {
        loop {
            match with_timeout(period, self.ctx.queue.receive()).await {
                Ok(BusMessage::Frame(frame)) => {
                    self.send(&frame).await;
                    // The previously shown frame goes back to its pool
                    drop(self.displayed.replace(frame));
                }
                Ok(BusMessage::Exit) => return,
                Err(_) => {
                    if let Some(frame) = self.displayed.take() {
                        self.send(&frame).await;
                        self.displayed = Some(frame);
                    }
                }
            }
        }
    }

    async fn send(&mut self, frame: &FrameBuffer) {
        let Err(e) = self.write_frame(frame).await else {
            trace!("bus {}: sent slot {}", self.ctx.id(), frame.slot());
            return;
        };

        self.window.invalidate();
        match e {
            DisplayError::BusTimeout => {
                warn!("bus {}: transfer timed out", self.ctx.id());
                if self.ctx.config().timeout_policy == TimeoutPolicy::Report {
                    self.ctx.latch_fault();
                }
            }
            other => error!("bus {}: frame failed: {}", self.ctx.id(), other),
        }
    }

    async fn write_frame(&mut self, frame: &FrameBuffer) -> Result<(), DisplayError> {
        let ctx = self.ctx;
        let mut bus = ctx.lock_bus().await;

        let window = frame.window();
        for (command, params) in self.window.plan(&ctx.address(), &window) {
            ctx.transact(&mut bus, |b| b.start_command(command, &params)).await?;
        }

        let write_command = ctx.address().write_command();
        let result = match ctx.transact(&mut bus, |b| b.begin_pixels(write_command)).await {
            Ok(()) => {
                let max = bus.max_transfer().max(1);
                let mut streamed = Ok(());
                for chunk in frame.data().chunks(max) {
                    streamed = ctx.transact(&mut bus, |b| b.start_pixels(chunk)).await;
                    if streamed.is_err() {
                        break;
                    }
                }
                streamed
            }
            Err(e) => Err(e),
        };
        let end = bus.end_pixels();
        result.and(end)
    }

    fn drain(&mut self) {
        let ctx = self.ctx;
        ctx.set_state(WorkerState::Draining);

        let mut released = ctx.release_queued();
        if let Some(frame) = self.displayed.take() {
            drop(frame);
            released += 1;
        }

        ctx.set_state(WorkerState::Stopped);
        // Frames whose submit was still waiting for room when draining began
        released += ctx.release_queued();

        info!("bus {}: worker stopped, released {} frames", ctx.id(), released);
        ctx.acknowledge_exit();
    }
}
