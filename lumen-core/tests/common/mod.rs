//! Host harness: a recording panel bus whose DMA completes on a helper
//! thread, and a driver that queues onto a bus context.

#![allow(dead_code)]

use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

use lumen_core::buffer::{ArenaKind, Arenas, FrameBuffer, FramePool, MemoryArena};
use lumen_core::bus::{AddressMode, BusContext, BusWorker};
use lumen_core::config::BusConfig;
use lumen_core::traits::{DisplayDriver, LcdBus, Transfer};
use lumen_core::DisplayError;
use lumen_hal::BoardIo;

pub type Raw = CriticalSectionRawMutex;
pub type Ctx = BusContext<Raw, SinkBus, 4>;

pub fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

pub fn arenas() -> Arenas {
    Arenas::new(leak(MemoryArena::new(ArenaKind::Sram, 1 << 20)))
}

/// Poll `cond` until it holds or `timeout` passes
pub fn wait_until(timeout: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    cond()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkEvent {
    Command(u8, Vec<u8>),
    Frame(Vec<u8>),
}

/// What reached the wire
#[derive(Debug, Clone, Default)]
pub struct SinkLog(Arc<Mutex<Vec<SinkEvent>>>);

impl SinkLog {
    pub fn events(&self) -> Vec<SinkEvent> {
        self.0.lock().unwrap().clone()
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Frame(data) => Some(data),
                SinkEvent::Command(..) => None,
            })
            .collect()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                SinkEvent::Command(cmd, _) => Some(cmd),
                SinkEvent::Frame(_) => None,
            })
            .collect()
    }

    fn push(&self, event: SinkEvent) {
        self.0.lock().unwrap().push(event);
    }
}

/// Panel bus that records traffic and completes pixel transfers after
/// `latency` on a separate thread, like a DMA interrupt would
pub struct SinkBus {
    log: SinkLog,
    irq: Option<mpsc::Sender<Duration>>,
    latency: Duration,
    pixels: Vec<u8>,
}

impl LcdBus for SinkBus {
    fn start_command(&mut self, command: u8, params: &[u8]) -> Result<Transfer, DisplayError> {
        self.log.push(SinkEvent::Command(command, params.to_vec()));
        Ok(Transfer::Done)
    }

    fn begin_pixels(&mut self, _write_command: u8) -> Result<Transfer, DisplayError> {
        self.pixels.clear();
        Ok(Transfer::Done)
    }

    fn start_pixels(&mut self, chunk: &[u8]) -> Result<Transfer, DisplayError> {
        self.pixels.extend_from_slice(chunk);
        if let Some(irq) = &self.irq {
            irq.send(self.latency).map_err(|_| DisplayError::Bus)?;
        }
        Ok(Transfer::Pending)
    }

    fn end_pixels(&mut self) -> Result<(), DisplayError> {
        self.log.push(SinkEvent::Frame(std::mem::take(&mut self.pixels)));
        Ok(())
    }

    fn max_transfer(&self) -> usize {
        64
    }
}

/// A bus context over a [`SinkBus`]
///
/// With `interrupts` off no transfer ever completes.
pub fn sink_context(latency: Duration, interrupts: bool, config: BusConfig) -> (&'static Ctx, SinkLog) {
    let log = SinkLog::default();
    let (tx, rx) = mpsc::channel::<Duration>();
    let bus = SinkBus {
        log: log.clone(),
        irq: interrupts.then_some(tx),
        latency,
        pixels: Vec::new(),
    };
    let ctx: &'static Ctx = leak(BusContext::new(0, bus, AddressMode::DCS, config));

    thread::spawn(move || {
        for delay in rx {
            thread::sleep(delay);
            ctx.on_transfer_complete();
        }
    });

    (ctx, log)
}

/// Run the context's worker on its own thread
pub fn spawn_worker(ctx: &'static Ctx) -> thread::JoinHandle<()> {
    let handle = thread::spawn(move || block_on(BusWorker::new(ctx).run()));
    assert!(wait_until(Duration::from_secs(1), || ctx.state() == lumen_core::WorkerState::Running));
    handle
}

/// A pool of `count` frames of `width` x `height` RGB565
pub fn pool<const N: usize>(count: usize, width: u16, height: u16) -> &'static FramePool<Raw, N> {
    let pool: &'static FramePool<Raw, N> = leak(FramePool::new());
    pool.provision(
        &arenas(),
        ArenaKind::Sram,
        lumen_core::pixel::PixelFormat::Rgb565,
        width,
        height,
        count,
    )
    .unwrap();
    pool
}

/// Frame with its first byte set to `tag`
pub fn tagged<const N: usize>(pool: &'static FramePool<Raw, N>, tag: u8) -> FrameBuffer {
    let mut frame = pool.try_acquire().expect("free frame");
    frame.data_mut()[0] = tag;
    frame
}

/// Driver that queues every frame onto a bus context
pub struct QueueDriver {
    pub ctx: &'static Ctx,
}

impl DisplayDriver for QueueDriver {
    async fn open(&self) -> Result<(), DisplayError> {
        Ok(())
    }

    async fn flush(&self, frame: FrameBuffer) -> Result<(), DisplayError> {
        self.ctx.submit(frame).await
    }

    async fn close(&self) -> Result<(), DisplayError> {
        Ok(())
    }

    fn retained_frames(&self) -> usize {
        self.ctx.config().refresh.retained_frames()
    }
}

/// Board without power or backlight lines
pub struct NullIo;

impl BoardIo for NullIo {
    type Error = ();

    fn gpio_init(&mut self, _pin: u8, _high: bool) -> Result<(), ()> {
        Ok(())
    }

    fn gpio_write(&mut self, _pin: u8, _high: bool) -> Result<(), ()> {
        Ok(())
    }

    fn gpio_deinit(&mut self, _pin: u8) -> Result<(), ()> {
        Ok(())
    }

    fn pwm_init(&mut self, _channel: u8, _frequency: u32, _inverted: bool) -> Result<(), ()> {
        Ok(())
    }

    fn pwm_set_duty(&mut self, _channel: u8, _duty: u16) -> Result<(), ()> {
        Ok(())
    }

    fn pwm_start(&mut self, _channel: u8) -> Result<(), ()> {
        Ok(())
    }

    fn pwm_stop(&mut self, _channel: u8) -> Result<(), ()> {
        Ok(())
    }

    fn pwm_deinit(&mut self, _channel: u8) -> Result<(), ()> {
        Ok(())
    }
}
