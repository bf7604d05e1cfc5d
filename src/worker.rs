//! Background acquisition thread.
//!
//! The worker owns a [`CaptureManager`] and polls it on its own thread so a
//! slow device cannot stall the analysis loop. Frames are published through
//! a single-slot channel: an unread frame is replaced by the next one.

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError, TrySendError};
use tracing::{debug, warn};

use crate::capture::{CaptureManager, DeviceOpener, DeviceState, FrameRead};

/// Requests sent to the worker thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerCommand {
    Select(u32),
    Close,
    Shutdown,
}

/// A frame pull together with the device state at the time of the pull.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkerFrame {
    pub read: FrameRead,
    pub state: DeviceState,
    /// Descriptor of the open device, or of the last failed attempt.
    pub descriptor: Option<String>,
    /// Why the most recent select failed. Cleared by the next select or close.
    pub error: Option<String>,
}

pub struct CaptureWorker {
    commands: Sender<WorkerCommand>,
    frames: Receiver<WorkerFrame>,
    handle: Option<JoinHandle<()>>,
}

impl CaptureWorker {
    /// Move `manager` onto a new thread that pulls a frame every `poll_interval`.
    pub fn spawn<O>(manager: CaptureManager<O>, poll_interval: Duration) -> Self
    where
        O: DeviceOpener + Send + 'static,
        O::Device: Send + 'static,
    {
        let (command_tx, command_rx) = unbounded();
        let (frame_tx, frame_rx) = bounded(1);
        let evict_rx = frame_rx.clone();

        let handle = thread::spawn(move || {
            capture_loop(manager, poll_interval, command_rx, frame_tx, evict_rx);
        });

        Self {
            commands: command_tx,
            frames: frame_rx,
            handle: Some(handle),
        }
    }

    pub fn select(&self, index: u32) {
        self.send(WorkerCommand::Select(index));
    }

    pub fn close_device(&self) {
        self.send(WorkerCommand::Close);
    }

    /// The newest unread frame, if one has arrived since the last call.
    pub fn latest(&self) -> Option<WorkerFrame> {
        self.frames.try_recv().ok()
    }

    /// Wait up to `timeout` for the next frame.
    pub fn next_timeout(&self, timeout: Duration) -> Option<WorkerFrame> {
        self.frames.recv_timeout(timeout).ok()
    }

    /// Stop the thread and release its device.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn send(&self, command: WorkerCommand) {
        if self.commands.send(command).is_err() {
            warn!(?command, "capture worker is no longer running");
        }
    }

    fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.commands.send(WorkerCommand::Shutdown);
            if handle.join().is_err() {
                warn!("capture worker panicked");
            }
        }
    }
}

impl Drop for CaptureWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn capture_loop<O: DeviceOpener>(
    mut manager: CaptureManager<O>,
    poll_interval: Duration,
    commands: Receiver<WorkerCommand>,
    frames: Sender<WorkerFrame>,
    evict: Receiver<WorkerFrame>,
) {
    let mut last_error = None;

    loop {
        loop {
            match commands.try_recv() {
                Ok(WorkerCommand::Select(index)) => {
                    last_error = match manager.select(index) {
                        Ok(_) => None,
                        Err(e) => {
                            warn!(error = %e, "capture worker could not open camera");
                            Some(e.to_string())
                        }
                    };
                }
                Ok(WorkerCommand::Close) => {
                    manager.close();
                    last_error = None;
                }
                Ok(WorkerCommand::Shutdown) | Err(TryRecvError::Disconnected) => {
                    manager.close();
                    debug!("capture worker stopped");
                    return;
                }
                Err(TryRecvError::Empty) => break,
            }
        }

        let frame = WorkerFrame {
            read: manager.read_frame(),
            state: manager.state(),
            descriptor: manager.descriptor().map(str::to_owned),
            error: last_error.clone(),
        };

        if let Err(TrySendError::Full(frame)) = frames.try_send(frame) {
            // Drop the stale frame so the consumer always sees the newest.
            let _ = evict.try_recv();
            let _ = frames.try_send(frame);
        }

        thread::sleep(poll_interval);
    }
}
