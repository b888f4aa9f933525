//! A minimal HTTP stub standing in for the ntfy push endpoint.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Counts requests and answers 500 for the first `fail_first` of them,
/// 200 afterwards.
pub struct StubNtfy {
    /// Base URL to point the notifier at.
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl StubNtfy {
    /// How many requests the stub has received.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

/// Bind on an ephemeral port and serve in a background task.
pub async fn spawn_stub(fail_first: usize) -> StubNtfy {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            let seen = counter.fetch_add(1, Ordering::SeqCst);
            read_request(&mut stream).await;
            let response = if seen < fail_first {
                "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            } else {
                "HTTP/1.1 200 OK\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
            };
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    StubNtfy {
        url: format!("http://{addr}"),
        hits,
    }
}

/// Accepts and reads requests but never responds, holding connections
/// open — a stand-in for a wedged push endpoint.
pub async fn spawn_stalling_stub() -> StubNtfy {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind stub");
    let addr = listener.local_addr().expect("stub addr");
    let hits = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&hits);
    tokio::spawn(async move {
        let mut held = Vec::new();
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                break;
            };
            counter.fetch_add(1, Ordering::SeqCst);
            read_request(&mut stream).await;
            held.push(stream);
        }
    });

    StubNtfy {
        url: format!("http://{addr}"),
        hits,
    }
}

/// Drain one HTTP request (headers plus `Content-Length` body) so the
/// client never sees the connection close mid-write.
async fn read_request(stream: &mut TcpStream) {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];

    let header_end = loop {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let headers = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let content_length = headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            if name.eq_ignore_ascii_case("content-length") {
                value.trim().parse::<usize>().ok()
            } else {
                None
            }
        })
        .unwrap_or(0);

    let body_read = buf.len().saturating_sub(header_end.saturating_add(4));
    let mut remaining = content_length.saturating_sub(body_read);
    while remaining > 0 {
        let Ok(n) = stream.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        remaining = remaining.saturating_sub(n);
    }
}
