//! Bus worker behaviour against a recording bus with threaded completions

mod common;

use std::thread;
use std::time::Duration;

use embassy_futures::block_on;

use common::*;
use lumen_core::buffer::{Arenas, FrameBuffer, Reclaim};
use lumen_core::config::{BusConfig, RefreshMode, TimeoutPolicy};
use lumen_core::{ArenaKind, DisplayError, WorkerState};

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn frames_reach_the_bus_in_submission_order() {
    let (ctx, log) = sink_context(Duration::from_millis(2), true, BusConfig::default());
    let pool = pool::<3>(3, 4, 2);
    spawn_worker(ctx);

    for tag in 1..=3 {
        block_on(ctx.submit(tagged(pool, tag))).unwrap();
    }

    assert!(wait_until(WAIT, || pool.available() == 3));
    let tags: Vec<u8> = log.frames().iter().map(|frame| frame[0]).collect();
    assert_eq!(tags, vec![1, 2, 3]);
    // The window is programmed once and reused for identical frames
    assert_eq!(log.commands(), vec![0x2A, 0x2B]);

    block_on(ctx.shutdown());
    assert_eq!(ctx.state(), WorkerState::Stopped);
}

#[test]
fn window_commands_carry_the_frame_geometry() {
    let (ctx, log) = sink_context(Duration::from_millis(1), true, BusConfig::default());
    let pool = pool::<1>(1, 16, 8);
    spawn_worker(ctx);

    block_on(ctx.submit(tagged(pool, 0))).unwrap();
    assert!(wait_until(WAIT, || pool.available() == 1));

    let events = log.events();
    assert_eq!(events[0], SinkEvent::Command(0x2A, vec![0, 0, 0, 15]));
    assert_eq!(events[1], SinkEvent::Command(0x2B, vec![0, 0, 0, 7]));
    // 16 x 8 RGB565 in 64 byte chunks, reassembled
    assert_eq!(log.frames()[0].len(), 16 * 8 * 2);

    block_on(ctx.shutdown());
}

#[test]
fn frames_offered_during_shutdown_are_released_unsent() {
    let (ctx, log) = sink_context(Duration::from_millis(1), true, BusConfig::default());
    let pool = pool::<3>(3, 4, 2);
    spawn_worker(ctx);

    // Keep the worker parked on the bus lock with frame A in hand
    let guard = block_on(ctx.lock_bus());
    block_on(ctx.submit(tagged(pool, 0xA))).unwrap();
    assert!(wait_until(WAIT, || ctx.pending() == 0));

    let stopper = thread::spawn(move || block_on(ctx.shutdown()));
    assert!(wait_until(WAIT, || ctx.pending() == 1));
    assert!(ctx.is_closed());

    assert_eq!(block_on(ctx.submit(tagged(pool, 0xB))), Err(DisplayError::BusClosed));
    assert_eq!(block_on(ctx.submit(tagged(pool, 0xC))), Err(DisplayError::BusClosed));
    assert_eq!(pool.available(), 2);

    drop(guard);
    stopper.join().unwrap();

    assert_eq!(ctx.state(), WorkerState::Stopped);
    let tags: Vec<u8> = log.frames().iter().map(|frame| frame[0]).collect();
    assert_eq!(tags, vec![0xA]);
    assert_eq!(pool.available(), 3);
    assert_eq!(pool.stats().released, 3);
}

#[test]
fn submit_after_shutdown_returns_the_frame() {
    let (ctx, log) = sink_context(Duration::from_millis(1), true, BusConfig::default());
    let pool = pool::<2>(2, 4, 2);
    block_on(ctx.shutdown());

    // More submits than the queue holds, none of them may stick
    for tag in 0..6 {
        assert_eq!(block_on(ctx.submit(tagged(pool, tag))), Err(DisplayError::BusClosed));
        assert_eq!(pool.available(), 2);
    }
    assert_eq!(ctx.pending(), 0);

    // A worker arriving late does not reopen the bus
    block_on(lumen_core::BusWorker::new(ctx).run());
    assert_eq!(ctx.state(), WorkerState::Stopped);
    assert!(log.frames().is_empty());
}

#[test]
fn shutdown_without_worker_drains_the_queue() {
    let (ctx, log) = sink_context(Duration::from_millis(1), true, BusConfig::default());
    let pool = pool::<2>(2, 4, 2);

    block_on(ctx.submit(tagged(pool, 1))).unwrap();
    block_on(ctx.submit(tagged(pool, 2))).unwrap();
    assert_eq!(ctx.pending(), 2);

    block_on(ctx.shutdown());

    assert_eq!(ctx.pending(), 0);
    assert_eq!(pool.available(), 2);
    assert!(log.frames().is_empty());
}

#[test]
fn second_worker_on_a_context_backs_off() {
    let (ctx, _log) = sink_context(Duration::from_millis(1), true, BusConfig::default());
    let first = spawn_worker(ctx);

    // Returns at once because the context is taken
    block_on(lumen_core::BusWorker::new(ctx).run());
    assert_eq!(ctx.state(), WorkerState::Running);

    block_on(ctx.shutdown());
    first.join().unwrap();
    assert_eq!(ctx.state(), WorkerState::Stopped);
}

struct CountingHome {
    count: std::sync::atomic::AtomicUsize,
}

impl Reclaim for CountingHome {
    fn reclaim(&self, frame: FrameBuffer) {
        self.count.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        frame.free();
    }
}

#[test]
fn each_frame_is_released_exactly_once() {
    let (ctx, _log) = sink_context(Duration::from_millis(1), true, BusConfig::default());
    let home: &'static CountingHome = leak(CountingHome {
        count: std::sync::atomic::AtomicUsize::new(0),
    });
    spawn_worker(ctx);

    let arenas = Arenas::new(leak(lumen_core::MemoryArena::new(ArenaKind::Sram, 4096)));
    for _ in 0..5 {
        let mut frame = FrameBuffer::create(&arenas, ArenaKind::Sram, 32).unwrap();
        frame.set_reclaim(home);
        block_on(ctx.submit(frame)).unwrap();
    }

    assert!(wait_until(WAIT, || home.count.load(std::sync::atomic::Ordering::SeqCst) == 5));
    block_on(ctx.shutdown());
    thread::sleep(Duration::from_millis(10));
    assert_eq!(home.count.load(std::sync::atomic::Ordering::SeqCst), 5);
}

#[test]
fn pool_counters_balance_after_many_cycles() {
    let (ctx, _log) = sink_context(Duration::from_millis(1), true, BusConfig::default());
    let pool = pool::<3>(3, 4, 2);
    spawn_worker(ctx);

    for _ in 0..30 {
        let frame = block_on(pool.acquire());
        block_on(ctx.submit(frame)).unwrap();
    }

    assert!(wait_until(WAIT, || pool.available() == 3));
    let stats = pool.stats();
    assert_eq!(stats.acquired, 30);
    assert_eq!(stats.released, 30);
    block_on(ctx.shutdown());
}

fn timeout_config(policy: TimeoutPolicy) -> BusConfig {
    BusConfig {
        transfer_timeout_ms: 20,
        refresh: RefreshMode::OnDemand,
        timeout_policy: policy,
    }
}

#[test]
fn timed_out_transfer_fails_the_next_submit_once() {
    let (ctx, _log) = sink_context(Duration::ZERO, false, timeout_config(TimeoutPolicy::Report));
    let pool = pool::<2>(2, 4, 2);
    spawn_worker(ctx);

    block_on(ctx.submit(tagged(pool, 1))).unwrap();
    // The frame comes back even though its transfer never completed
    assert!(wait_until(WAIT, || pool.available() == 2));

    assert_eq!(block_on(ctx.submit(tagged(pool, 2))), Err(DisplayError::BusTimeout));
    assert_eq!(pool.available(), 2);

    assert_eq!(block_on(ctx.submit(tagged(pool, 3))), Ok(()));
    assert!(wait_until(WAIT, || pool.available() == 2));
    block_on(ctx.shutdown());
}

#[test]
fn best_effort_swallows_timeouts() {
    let (ctx, _log) = sink_context(Duration::ZERO, false, timeout_config(TimeoutPolicy::BestEffort));
    let pool = pool::<2>(2, 4, 2);
    spawn_worker(ctx);

    block_on(ctx.submit(tagged(pool, 1))).unwrap();
    assert!(wait_until(WAIT, || pool.available() == 2));

    assert_eq!(block_on(ctx.submit(tagged(pool, 2))), Ok(()));
    assert!(wait_until(WAIT, || pool.available() == 2));
    assert!(!ctx.take_fault());
    block_on(ctx.shutdown());
}

#[test]
fn periodic_refresh_keeps_resending_the_last_frame() {
    let config = BusConfig {
        refresh: RefreshMode::Periodic { period_ms: 15 },
        ..BusConfig::default()
    };
    let (ctx, log) = sink_context(Duration::from_millis(1), true, config);
    let pool = pool::<3>(3, 4, 2);
    spawn_worker(ctx);

    block_on(ctx.submit(tagged(pool, 1))).unwrap();
    assert!(wait_until(WAIT, || log.frames().len() >= 3));
    // Held as the displayed frame
    assert_eq!(pool.available(), 2);
    assert!(log.frames().iter().all(|frame| frame[0] == 1));

    block_on(ctx.submit(tagged(pool, 2))).unwrap();
    assert!(wait_until(WAIT, || log.frames().last().map(|f| f[0]) == Some(2)));
    // The first frame goes home, the second replaces it
    assert!(wait_until(WAIT, || pool.available() == 2));

    block_on(ctx.shutdown());
    assert_eq!(pool.available(), 3);
}
