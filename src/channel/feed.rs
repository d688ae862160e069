use super::protocol::{apply, decode, encode, ClientMessage};
use crate::selection::DeployCommand;
use crate::state::SnapshotStore;
use anyhow::{Context, Result};
use futures::{Stream, StreamExt};
use std::io;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Counts reported when a feed ends
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedSummary {
    pub applied: usize,
    pub skipped: usize,
    pub blank: usize,
}

/// Apply every frame of `frames` to `store` until the stream ends.
///
/// Frames are raw lines. Frames that are not UTF-8 or fail to decode are
/// logged and skipped. Only a read error from the transport ends the feed.
pub async fn run_feed<S, B>(frames: S, store: &SnapshotStore) -> Result<FeedSummary>
where
    S: Stream<Item = io::Result<B>>,
    B: AsRef<[u8]>,
{
    let mut frames = std::pin::pin!(frames);
    let mut summary = FeedSummary::default();

    info!("Channel feed started");

    while let Some(frame) = frames.next().await {
        let frame = frame.context("Failed to read channel frame")?;
        let frame = match std::str::from_utf8(frame.as_ref()) {
            Ok(text) => text.trim(),
            Err(e) => {
                warn!(error = %e, "Skipping channel frame that is not UTF-8");
                summary.skipped += 1;
                continue;
            }
        };

        if frame.is_empty() {
            summary.blank += 1;
            continue;
        }

        match decode(frame) {
            Ok(message) => {
                debug!(event = message.event(), count = message.len(), "Frame received");
                apply(store, message);
                summary.applied += 1;
            }
            Err(e) => {
                warn!(error = %e, "Skipping channel frame");
                summary.skipped += 1;
            }
        }
    }

    info!(
        applied = summary.applied,
        skipped = summary.skipped,
        "Channel feed ended"
    );

    Ok(summary)
}

/// Sending half of the outbound command queue
#[derive(Debug, Clone)]
pub struct CommandSender {
    tx: mpsc::Sender<ClientMessage>,
}

/// Create the outbound command queue
pub fn command_channel(capacity: usize) -> (CommandSender, mpsc::Receiver<ClientMessage>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (CommandSender { tx }, rx)
}

impl CommandSender {
    pub async fn send(&self, message: ClientMessage) -> Result<()> {
        self.tx
            .send(message)
            .await
            .map_err(|_| anyhow::anyhow!("Command channel closed"))
    }

    pub async fn deploy(&self, command: DeployCommand) -> Result<()> {
        info!(
            drone_id = %command.drone_id(),
            emergency_id = %command.emergency_id(),
            "Emitting deployDrone"
        );
        self.send(command.into()).await
    }
}

/// Write queued commands to `writer` as JSON lines until every sender is gone
pub async fn write_commands<W>(mut rx: mpsc::Receiver<ClientMessage>, mut writer: W) -> Result<usize>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;

    while let Some(message) = rx.recv().await {
        let mut line = encode(&message).context("Failed to encode command")?;
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .context("Failed to write command")?;
        writer.flush().await.context("Failed to flush command")?;
        written += 1;
    }

    Ok(written)
}
