//! Async worker - runs in Tokio runtime and handles backend requests

use std::sync::mpsc::{Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tokio::time::interval;

use crate::domain::Session;
use crate::infrastructure::api::Collaborators;
use crate::infrastructure::runtime::bridge::{RuntimeCommand, RuntimeEvent};

/// Run the async worker loop
///
/// Every request runs as its own task, so overlapping statistics fetches
/// settle in whatever order the backend answers them.
pub async fn run_async_worker(
    collaborators: Collaborators,
    session: Session,
    cmd_rx: Receiver<RuntimeCommand>,
    evt_tx: Sender<RuntimeEvent>,
) -> Result<()> {
    let session = Arc::new(session);
    let mut poll_interval = interval(Duration::from_millis(20));

    loop {
        poll_interval.tick().await;

        // Process commands (non-blocking)
        loop {
            let cmd = match cmd_rx.try_recv() {
                Ok(cmd) => cmd,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => return Ok(()),
            };

            match cmd {
                RuntimeCommand::Shutdown => return Ok(()),

                RuntimeCommand::FetchStatistics { generation } => {
                    let source = collaborators.stats.clone();
                    let session = session.clone();
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        let result = source.fetch_instructor_statistics(&session).await;
                        let _ = evt_tx.send(RuntimeEvent::StatisticsLoaded { generation, result });
                    });
                }

                RuntimeCommand::FetchGroups => {
                    let source = collaborators.groups.clone();
                    let session = session.clone();
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        let result = source.list_groups(&session).await;
                        let _ = evt_tx.send(RuntimeEvent::GroupsLoaded { result });
                    });
                }

                RuntimeCommand::FetchRoster { group_id } => {
                    let source = collaborators.groups.clone();
                    let session = session.clone();
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        let result = source.list_students(&session, &group_id).await;
                        let _ = evt_tx.send(RuntimeEvent::RosterLoaded { group_id, result });
                    });
                }

                RuntimeCommand::SubmitAttendance { record } => {
                    let source = collaborators.groups.clone();
                    let session = session.clone();
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        let result = source.submit_attendance(&session, &record).await;
                        let _ = evt_tx.send(RuntimeEvent::AttendanceSubmitted {
                            group_id: record.group_id,
                            result,
                        });
                    });
                }

                RuntimeCommand::SignOut { session } => {
                    let auth = collaborators.auth.clone();
                    let evt_tx = evt_tx.clone();
                    tokio::spawn(async move {
                        let error = auth.sign_out(&session).await.err().map(|err| {
                            tracing::warn!(error = %err, "remote sign-out failed");
                            err.to_string()
                        });
                        let _ = evt_tx.send(RuntimeEvent::SignedOut { error });
                    });
                }
            }
        }
    }
}
