//! Debounced render ticks

use super::Command;
use crate::snapshot::{next_settled, SnapshotStream};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Forward each settled snapshot to the actor as a render command
///
/// Runs until `shutdown` fires, the queue is dropped, or the actor stops
/// accepting commands.
pub(super) async fn run(
    mut stream: SnapshotStream,
    window: Duration,
    commands: mpsc::Sender<Command>,
    shutdown: CancellationToken,
) {
    loop {
        let snapshot = tokio::select! {
            _ = shutdown.cancelled() => break,
            settled = next_settled(&mut stream, window) => match settled {
                Some(snapshot) => snapshot,
                None => break,
            },
        };

        tokio::select! {
            _ = shutdown.cancelled() => break,
            sent = commands.send(Command::Render(snapshot)) => {
                if sent.is_err() {
                    break;
                }
            }
        }
    }

    debug!("Render loop stopped");
}
