//! WebSocket price feed.

use std::time::Duration;

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use robotrade_core::{FeedError, PriceFeed, Tick, TickStream};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tokio_stream::wrappers::ReceiverStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::{debug, warn};

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Buffer between the socket reader and the consumer. Absorbs bursts
/// without unbounded growth.
const CHANNEL_CAPACITY: usize = 64;

/// Live price feed over WebSocket.
///
/// One subscription per ticker: `stream_prices` dials
/// `{url}?ticker={ticker}` and expects the server to push JSON tick
/// frames for that instrument. Dropping the returned stream closes the
/// socket. There is no reconnect; the caller re-subscribes next cycle.
pub struct WsPriceFeed {
    url: String,
    connect_timeout: Duration,
}

impl WsPriceFeed {
    /// Create a feed dialing the given WebSocket endpoint.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Set how long to wait for the connection handshake.
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    // The handshake request target must start with "/", so a base URL
    // with no path gets one inserted ahead of the query.
    fn subscription_url(&self, ticker: &str) -> String {
        let ticker = urlencoding::encode(ticker);
        let tail_start = self.url.find("://").map_or(0, |i| i + 3);
        let tail = &self.url[tail_start..];
        match tail.find(['/', '?']) {
            Some(i) if tail[i..].starts_with('?') => {
                let (base, query) = self.url.split_at(tail_start + i);
                format!("{base}/{query}&ticker={ticker}")
            }
            Some(_) if tail.contains('?') => format!("{}&ticker={}", self.url, ticker),
            Some(_) => format!("{}?ticker={}", self.url, ticker),
            None => format!("{}/?ticker={}", self.url, ticker),
        }
    }
}

#[async_trait]
impl PriceFeed for WsPriceFeed {
    async fn stream_prices(&self, ticker: &str) -> Result<TickStream, FeedError> {
        let url = self.subscription_url(ticker);
        let connected = timeout(self.connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| FeedError::Connect {
                ticker: ticker.to_owned(),
                reason: "connect timed out".to_owned(),
            })?;
        let (socket, _) = connected.map_err(|err| FeedError::Connect {
            ticker: ticker.to_owned(),
            reason: err.to_string(),
        })?;
        debug!(ticker = %ticker, url = %url, "price subscription open");

        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
        tokio::spawn(run_socket(socket, ticker.to_owned(), tx));
        Ok(ReceiverStream::new(rx).boxed())
    }
}

/// Pump socket frames into the channel until the consumer goes away, the
/// server closes, or the socket fails. Malformed tick frames are skipped;
/// a transport error is surfaced as the final stream item.
async fn run_socket(
    socket: WebSocketStream<MaybeTlsStream<TcpStream>>,
    ticker: String,
    tx: mpsc::Sender<Result<Tick, FeedError>>,
) {
    let (mut write, mut read) = socket.split();
    loop {
        let message = tokio::select! {
            _ = tx.closed() => break,
            message = read.next() => message,
        };
        match message {
            Some(Ok(Message::Text(raw))) => match serde_json::from_str::<Tick>(&raw) {
                Ok(tick) => {
                    if tx.send(Ok(tick)).await.is_err() {
                        break;
                    }
                }
                Err(err) => {
                    warn!(ticker = %ticker, error = %err, "skipping malformed tick");
                }
            },
            Some(Ok(Message::Ping(payload))) => {
                if write.send(Message::Pong(payload)).await.is_err() {
                    break;
                }
            }
            Some(Ok(Message::Close(_))) => {
                debug!(ticker = %ticker, "price socket closed by server");
                break;
            }
            Some(Ok(_)) => {}
            Some(Err(err)) => {
                let _ = tx.send(Err(FeedError::Stream(err.to_string()))).await;
                break;
            }
            None => {
                debug!(ticker = %ticker, "price socket ended");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_async;

    #[test]
    fn test_subscription_url_appends_ticker() {
        let feed = WsPriceFeed::new("ws://localhost:9000/prices");
        assert_eq!(
            feed.subscription_url("AAPL"),
            "ws://localhost:9000/prices?ticker=AAPL"
        );

        let feed = WsPriceFeed::new("ws://localhost:9000/prices?token=abc");
        assert_eq!(
            feed.subscription_url("TSLA"),
            "ws://localhost:9000/prices?token=abc&ticker=TSLA"
        );
    }

    #[test]
    fn test_subscription_url_roots_a_pathless_base() {
        let feed = WsPriceFeed::new("ws://localhost:9000");
        assert_eq!(
            feed.subscription_url("AAPL"),
            "ws://localhost:9000/?ticker=AAPL"
        );

        let feed = WsPriceFeed::new("ws://localhost:9000?token=abc");
        assert_eq!(
            feed.subscription_url("TSLA"),
            "ws://localhost:9000/?token=abc&ticker=TSLA"
        );
    }

    #[test]
    fn test_subscription_url_escapes_the_ticker() {
        let feed = WsPriceFeed::new("ws://localhost:9000/prices");
        assert_eq!(
            feed.subscription_url("A&B=C D"),
            "ws://localhost:9000/prices?ticker=A%26B%3DC%20D"
        );
    }

    #[tokio::test]
    async fn test_stream_delivers_ticks_and_skips_malformed() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = accept_async(stream).await.unwrap();
            let frames = [
                r#"{"ticker":"AAPL","buy_price":100.0,"sell_price":101.0}"#,
                "not a tick",
                r#"{"ticker":"AAPL","buy_price":99.0,"sell_price":100.5}"#,
            ];
            for frame in frames {
                socket.send(Message::Text(frame.to_owned())).await.unwrap();
            }
            socket.send(Message::Close(None)).await.unwrap();
        });

        let feed = WsPriceFeed::new(format!("ws://{addr}"));
        let mut stream = feed.stream_prices("AAPL").await.unwrap();

        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.buy_price, 100.0);
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.buy_price, 99.0);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_ping_is_answered_before_more_ticks_flow() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        // The server releases the tick only after seeing the pong, so the
        // client assertions below prove the ping was answered.
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut socket = accept_async(stream).await.unwrap();
            socket
                .send(Message::Ping(b"keepalive".to_vec()))
                .await
                .unwrap();
            loop {
                match socket.next().await {
                    Some(Ok(Message::Pong(payload))) => {
                        assert_eq!(payload, b"keepalive");
                        break;
                    }
                    Some(Ok(_)) => {}
                    other => panic!("no pong, got {other:?}"),
                }
            }
            socket
                .send(Message::Text(
                    r#"{"ticker":"AAPL","buy_price":100.0,"sell_price":101.0}"#.to_owned(),
                ))
                .await
                .unwrap();
            socket.send(Message::Close(None)).await.unwrap();
        });

        let feed = WsPriceFeed::new(format!("ws://{addr}/prices"));
        let mut stream = feed.stream_prices("AAPL").await.unwrap();

        let tick = stream.next().await.unwrap().unwrap();
        assert_eq!(tick.buy_price, 100.0);
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn test_connect_failure_is_reported() {
        let feed = WsPriceFeed::new("ws://127.0.0.1:1");
        let err = feed.stream_prices("AAPL").await.err().unwrap();
        match err {
            FeedError::Connect { ticker, .. } => assert_eq!(ticker, "AAPL"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
