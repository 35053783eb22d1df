//! Generic bus display driver
//!
//! One [`BusDisplay`] serves every panel whose controller takes an
//! init-sequence table: open pulses reset and plays the table through the
//! panel's bus, flush queues the frame on the bus worker, close plays an
//! optional sleep table.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::Timer;
use lumen_core::buffer::FrameBuffer;
use lumen_core::init_seq::InitSequence;
use lumen_core::traits::{DisplayDriver, LcdBus};
use lumen_core::{BusContext, DisplayError};

/// Display off, then sleep in
pub const DCS_SLEEP: &[u8] = &[1, 0, 0x28, 1, 120, 0x10, 0];

/// Reset pulse shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ResetTiming {
    /// Released before the pulse
    pub settle_ms: u16,
    /// Pulse width
    pub pulse_ms: u16,
    /// Wait after release before the first command
    pub ready_ms: u16,
}

impl ResetTiming {
    /// No reset line
    pub const NONE: Self = Self {
        settle_ms: 0,
        pulse_ms: 0,
        ready_ms: 0,
    };

    fn is_none(&self) -> bool {
        *self == Self::NONE
    }
}

impl Default for ResetTiming {
    fn default() -> Self {
        Self {
            settle_ms: 100,
            pulse_ms: 100,
            ready_ms: 100,
        }
    }
}

/// Display driver over a [`BusContext`]
pub struct BusDisplay<M: RawMutex + 'static, B: LcdBus + 'static, const Q: usize> {
    ctx: &'static BusContext<M, B, Q>,
    init: InitSequence<'static>,
    sleep: Option<InitSequence<'static>>,
    reset: ResetTiming,
}

impl<M: RawMutex + 'static, B: LcdBus + 'static, const Q: usize> BusDisplay<M, B, Q> {
    /// Drive a panel with the given init table
    pub fn new(ctx: &'static BusContext<M, B, Q>, init: InitSequence<'static>) -> Self {
        Self {
            ctx,
            init,
            sleep: None,
            reset: ResetTiming::default(),
        }
    }

    /// Table played on close
    pub fn with_sleep(mut self, sleep: InitSequence<'static>) -> Self {
        self.sleep = Some(sleep);
        self
    }

    pub fn with_reset(mut self, reset: ResetTiming) -> Self {
        self.reset = reset;
        self
    }

    /// The bus this panel sits on
    pub fn context(&self) -> &'static BusContext<M, B, Q> {
        self.ctx
    }

    async fn play(&self, sequence: &InitSequence<'_>) -> Result<(), DisplayError> {
        let ctx = self.ctx;
        let mut bus = ctx.lock_bus().await;
        for cmd in sequence {
            ctx.transact(&mut bus, |b| b.start_command(cmd.command, cmd.params)).await?;
            if cmd.delay_ms > 0 {
                Timer::after_millis(cmd.delay_ms as u64).await;
            }
        }
        Ok(())
    }

    async fn pulse_reset(&self) {
        if self.reset.is_none() {
            return;
        }
        let mut bus = self.ctx.lock_bus().await;
        bus.set_reset(false);
        Timer::after_millis(self.reset.settle_ms as u64).await;
        bus.set_reset(true);
        Timer::after_millis(self.reset.pulse_ms as u64).await;
        bus.set_reset(false);
        Timer::after_millis(self.reset.ready_ms as u64).await;
    }
}

impl<M: RawMutex + 'static, B: LcdBus + 'static, const Q: usize> DisplayDriver for BusDisplay<M, B, Q> {
    async fn open(&self) -> Result<(), DisplayError> {
        self.pulse_reset().await;
        self.play(&self.init).await?;
        debug!("bus {}: panel initialized, {} commands", self.ctx.id(), self.init.len());
        Ok(())
    }

    async fn flush(&self, frame: FrameBuffer) -> Result<(), DisplayError> {
        self.ctx.submit(frame).await
    }

    async fn close(&self) -> Result<(), DisplayError> {
        match &self.sleep {
            Some(sleep) => self.play(sleep).await,
            None => Ok(()),
        }
    }

    fn retained_frames(&self) -> usize {
        self.ctx.config().refresh.retained_frames()
    }
}
