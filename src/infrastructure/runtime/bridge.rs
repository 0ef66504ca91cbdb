//! Runtime bridge - connects sync TUI thread with async Tokio runtime
//!
//! The TUI thread owns all dashboard state. Network calls run on a
//! dedicated Tokio runtime thread and report back as events, which the
//! TUI applies in arrival order.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use tokio::runtime::Runtime;

use crate::domain::{
    ApiError, AttendanceRecord, Group, Session, Statistics, StatsFetchError, Student,
};
use crate::infrastructure::api::Collaborators;
use crate::infrastructure::runtime::worker::run_async_worker;

/// Commands sent from the TUI to the async worker
#[derive(Debug, Clone)]
pub enum RuntimeCommand {
    /// Fetch instructor statistics, tagged with the loader's generation
    FetchStatistics { generation: u64 },
    /// Fetch the instructor's groups
    FetchGroups,
    /// Fetch the roster of one group
    FetchRoster { group_id: String },
    /// Submit an attendance record
    SubmitAttendance { record: AttendanceRecord },
    /// Invalidate the session
    SignOut { session: Session },
    /// Shutdown the worker
    Shutdown,
}

/// Events sent from the async worker to the TUI
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A statistics request settled
    StatisticsLoaded {
        generation: u64,
        result: Result<Statistics, StatsFetchError>,
    },
    /// Group listing settled
    GroupsLoaded { result: Result<Vec<Group>, ApiError> },
    /// Roster settled
    RosterLoaded {
        group_id: String,
        result: Result<Vec<Student>, ApiError>,
    },
    /// Attendance submission settled
    AttendanceSubmitted {
        group_id: String,
        result: Result<(), ApiError>,
    },
    /// Sign-out settled; `error` carries the remote failure, if any
    SignedOut { error: Option<String> },
    /// Error occurred
    Error { message: String },
}

/// Bridge between sync TUI thread and async Tokio runtime
pub struct RuntimeBridge {
    cmd_tx: Sender<RuntimeCommand>,
    evt_rx: Receiver<RuntimeEvent>,
}

impl RuntimeBridge {
    /// Spawn the worker thread for the given collaborators and session
    pub fn new(collaborators: Collaborators, session: Session) -> anyhow::Result<Self> {
        let (cmd_tx, cmd_rx) = mpsc::channel::<RuntimeCommand>();
        let (evt_tx, evt_rx) = mpsc::channel::<RuntimeEvent>();

        let rt = Runtime::new()?;
        thread::Builder::new()
            .name("attendance-runtime".to_string())
            .spawn(move || {
                rt.block_on(async {
                    if let Err(err) =
                        run_async_worker(collaborators, session, cmd_rx, evt_tx.clone()).await
                    {
                        tracing::error!(error = %err, "runtime worker exited");
                        let _ = evt_tx.send(RuntimeEvent::Error {
                            message: format!("Worker exited: {:#}", err),
                        });
                    }
                });
            })?;

        Ok(Self { cmd_tx, evt_rx })
    }

    /// Send a command to the async worker
    pub fn send(&self, cmd: RuntimeCommand) -> anyhow::Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| anyhow::anyhow!("Worker channel closed"))
    }

    /// Poll for events (non-blocking)
    pub fn poll_events(&self) -> Vec<RuntimeEvent> {
        let mut events = Vec::new();
        while let Ok(evt) = self.evt_rx.try_recv() {
            events.push(evt);
        }
        events
    }

    /// Wait for a single event, up to `timeout`
    pub fn recv_timeout(&self, timeout: std::time::Duration) -> Option<RuntimeEvent> {
        self.evt_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for RuntimeBridge {
    fn drop(&mut self) {
        // Try to send shutdown command
        let _ = self.cmd_tx.send(RuntimeCommand::Shutdown);
    }
}
