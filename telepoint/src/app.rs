use std::cell::{Cell, RefCell};
use std::sync::mpsc as std_mpsc;
use std::time::Instant;

use anyhow::Result;
use core_foundation::runloop::{kCFRunLoopDefaultMode, CFRunLoop};
use tokio::sync::mpsc;

use telepoint_ipc::{Command, Response};

use crate::command::{apply_settings_change, handle_command, teleport_to_saved};
use crate::core::{
    CursorSample, PositionStore, SettingsChange, SettingsStore, StationaryDetector, POLL_INTERVAL,
};
use crate::ipc::IpcServer;
use crate::macos::{self, HotkeyManager, HotkeyTrigger};
use crate::platform::{CursorSystem, MacosCursorSystem};
use crate::teleport::TeleportEngine;

type IpcCommandWithResponse = (Command, mpsc::Sender<Response>);

/// Main-loop tick. Short enough that IPC commands and due verifications
/// feel immediate; the cursor itself is only sampled every POLL_INTERVAL.
const TICK_INTERVAL: f64 = 0.05;

struct RunLoopContext {
    ipc_cmd_rx: std_mpsc::Receiver<IpcCommandWithResponse>,
    trigger_rx: std_mpsc::Receiver<HotkeyTrigger>,
    change_rx: std_mpsc::Receiver<SettingsChange>,
    system: MacosCursorSystem,
    started_at: Instant,
    store: RefCell<PositionStore>,
    detector: RefCell<StationaryDetector>,
    settings: RefCell<SettingsStore>,
    hotkeys: RefCell<HotkeyManager>,
    engine: RefCell<TeleportEngine>,
    next_poll_at: Cell<f64>,
}

pub struct App {}

impl App {
    pub fn run() -> Result<()> {
        if !macos::is_trusted() {
            tracing::warn!("Accessibility permission not granted, requesting...");
            macos::is_trusted_with_prompt();
            anyhow::bail!("Please grant Accessibility permission and restart");
        }

        // Channel: IPC commands (tokio -> main thread)
        let (ipc_cmd_tx, ipc_cmd_rx) = std_mpsc::channel::<IpcCommandWithResponse>();

        // Channel for IPC server (tokio internal)
        let (ipc_tx, ipc_rx) = mpsc::channel::<IpcCommandWithResponse>(256);

        // Spawn tokio runtime in separate thread
        std::thread::spawn(move || {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async move {
                Self::run_async(ipc_cmd_tx, ipc_tx, ipc_rx).await;
            });
        });

        let app = App {};
        app.run_main_loop(ipc_cmd_rx);

        Ok(())
    }

    async fn run_async(
        ipc_cmd_tx: std_mpsc::Sender<IpcCommandWithResponse>,
        ipc_server_tx: mpsc::Sender<IpcCommandWithResponse>,
        mut ipc_rx: mpsc::Receiver<IpcCommandWithResponse>,
    ) {
        tracing::info!("Tokio runtime started");

        // Start IPC server
        let ipc_server = IpcServer::new(ipc_server_tx);
        tokio::spawn(async move {
            if let Err(e) = ipc_server.run().await {
                tracing::error!("IPC server error: {}", e);
            }
        });

        // Forward IPC commands to the main thread
        while let Some((cmd, resp_tx)) = ipc_rx.recv().await {
            if ipc_cmd_tx.send((cmd, resp_tx)).is_err() {
                tracing::error!("Failed to forward IPC command to main thread");
                break;
            }
        }

        tracing::info!("Tokio runtime exiting");
    }

    fn run_main_loop(self, ipc_cmd_rx: std_mpsc::Receiver<IpcCommandWithResponse>) {
        tracing::info!("Starting main loop");

        // Channel: hotkey trigger callback -> main loop tick
        let (trigger_tx, trigger_rx) = std_mpsc::channel::<HotkeyTrigger>();

        // Channel: settings mutations -> main loop tick
        let (change_tx, change_rx) = std_mpsc::channel::<SettingsChange>();

        let settings = SettingsStore::load(change_tx);
        let detector = StationaryDetector::new(settings.save_interval());
        let mut hotkeys = HotkeyManager::new(trigger_tx);
        hotkeys.rebind(settings.shortcut());

        tracing::info!(
            "Watching cursor, save interval {}s",
            settings.save_interval()
        );

        let context = Box::new(RunLoopContext {
            ipc_cmd_rx,
            trigger_rx,
            change_rx,
            system: MacosCursorSystem,
            started_at: Instant::now(),
            store: RefCell::new(PositionStore::new()),
            detector: RefCell::new(detector),
            settings: RefCell::new(settings),
            hotkeys: RefCell::new(hotkeys),
            engine: RefCell::new(TeleportEngine::new()),
            next_poll_at: Cell::new(0.0),
        });
        let mut timer_context = core_foundation::runloop::CFRunLoopTimerContext {
            version: 0,
            info: Box::into_raw(context) as *mut _,
            retain: None,
            release: None,
            copyDescription: None,
        };

        extern "C" fn timer_callback(
            _timer: core_foundation::runloop::CFRunLoopTimerRef,
            info: *mut std::ffi::c_void,
        ) {
            let ctx = unsafe { &*(info as *const RunLoopContext) };
            let now = ctx.started_at.elapsed().as_secs_f64();

            // Process IPC commands
            while let Ok((cmd, resp_tx)) = ctx.ipc_cmd_rx.try_recv() {
                tracing::debug!("Received IPC command: {:?}", cmd);
                let response = handle_command(
                    &cmd,
                    &ctx.system,
                    &ctx.store,
                    &ctx.settings,
                    &ctx.engine,
                    now,
                );
                let _ = resp_tx.blocking_send(response);

                // Handle Quit command after sending response
                if matches!(cmd, Command::Quit) {
                    CFRunLoop::get_current().stop();
                }
            }

            // Process hotkey triggers
            while ctx.trigger_rx.try_recv().is_ok() {
                tracing::info!("Shortcut triggered, teleporting to saved position");
                teleport_to_saved(&ctx.system, &ctx.store, &ctx.engine, now);
            }

            // Process settings change notifications
            while let Ok(change) = ctx.change_rx.try_recv() {
                apply_settings_change(change, &ctx.settings, &ctx.detector, &ctx.hotkeys);
            }

            // Sample the cursor at the fixed poll cadence
            if now >= ctx.next_poll_at.get() {
                ctx.next_poll_at.set(now + POLL_INTERVAL);
                let sample = CursorSample::new(ctx.system.cursor_position(), now);
                let mut detector = ctx.detector.borrow_mut();
                if let Some(anchor) = detector.observe(sample) {
                    ctx.store.borrow_mut().set(anchor.position);
                    tracing::info!(
                        "Cursor stationary for {}s, saved ({}, {})",
                        detector.save_interval(),
                        anchor.position.x,
                        anchor.position.y
                    );
                }
            }

            // Run teleport verifications whose delay has elapsed
            ctx.engine
                .borrow_mut()
                .run_due_verifications(&ctx.system, now);
        }

        let timer = unsafe {
            core_foundation::runloop::CFRunLoopTimer::new(
                core_foundation::date::CFAbsoluteTimeGetCurrent(),
                TICK_INTERVAL,
                0,
                0,
                timer_callback,
                &mut timer_context,
            )
        };

        let run_loop = CFRunLoop::get_current();
        run_loop.add_timer(&timer, unsafe { kCFRunLoopDefaultMode });

        tracing::info!("Entering CFRunLoop");
        CFRunLoop::run_current();
        tracing::info!("CFRunLoop exited");
    }
}
