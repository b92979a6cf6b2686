use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::protocol::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use uuid::Uuid;

use crate::constants::{BEATLEADER_WS_URL, FEED_RECONNECT_DELAY, SCORESABER_WS_URL};
use crate::score::Platform;
use crate::score::handler::ScoreHandler;

type FeedStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone, Copy)]
pub struct Feed {
    pub platform: Platform,
    pub url: &'static str,
}

pub const FEEDS: [Feed; 2] = [
    Feed {
        platform: Platform::ScoreSaber,
        url: SCORESABER_WS_URL,
    },
    Feed {
        platform: Platform::BeatLeader,
        url: BEATLEADER_WS_URL,
    },
];

/// One always-on worker per platform feed. Each worker owns its connection
/// lifecycle and never takes the process down with it.
pub fn spawn_feeds(
    handler: Arc<ScoreHandler>,
    cancel: CancellationToken,
) -> Vec<JoinHandle<()>> {
    FEEDS
        .iter()
        .map(|feed| {
            let handler = Arc::clone(&handler);
            let cancel = cancel.clone();
            tokio::spawn(run_feed(*feed, handler, cancel))
        })
        .collect()
}

/// Connect, drain frames, reconnect after a fixed delay on any failure,
/// forever. A fresh connection starts from the platform's live stream, so a
/// reconnect never replays messages this worker already processed.
#[instrument(skip(handler, cancel), fields(platform = %feed.platform, url = feed.url, worker = %Uuid::new_v4()))]
async fn run_feed(feed: Feed, handler: Arc<ScoreHandler>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::info!("feed worker stopping");
                return;
            }

            connected = connect_async(feed.url) => match connected {
                Ok((stream, _)) => {
                    tracing::info!("feed connected");
                    if read_frames(stream, &feed, &handler, &cancel).await {
                        return;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "feed connection failed");
                }
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => return,
            _ = tokio::time::sleep(FEED_RECONNECT_DELAY) => {
                tracing::info!("reconnecting feed");
            }
        }
    }
}

/// Drains one connection. Returns `true` when the worker was cancelled and
/// `false` when the connection dropped and the caller should redial.
async fn read_frames(
    stream: FeedStream,
    feed: &Feed,
    handler: &ScoreHandler,
    cancel: &CancellationToken,
) -> bool {
    let (mut writer, mut reader) = stream.split();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                let _ = writer.send(Message::Close(None)).await;
                return true;
            }

            frame = reader.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    handler.ingest(feed.platform, text.as_bytes()).await;
                }

                Some(Ok(Message::Ping(payload))) => {
                    if let Err(e) = writer.send(Message::Pong(payload)).await {
                        tracing::warn!(error = %e, "keepalive reply failed");
                        return false;
                    }
                }

                Some(Ok(Message::Close(frame))) => {
                    tracing::warn!(frame = ?frame, "feed closed by remote");
                    return false;
                }

                // binary / pong frames are nothing we asked for
                Some(Ok(_)) => {}

                Some(Err(e)) => {
                    tracing::warn!(error = %e, "feed read failure");
                    return false;
                }

                None => {
                    tracing::warn!("feed stream ended");
                    return false;
                }
            }
        }
    }
}
