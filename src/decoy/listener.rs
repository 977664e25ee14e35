//! Accept loop and per-connection responders for the decoy role.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::cracker::token::format_token;
use crate::lines::service_trait::LineSink;
use crate::protocol::handshake::capture;
use crate::protocol::rfb::{CaptureOutcome, ProtocolVersion};

#[derive(Debug, Clone)]
/// Where the decoy listens and how it presents itself.
pub struct DecoySettings {
    pub bind_address: String,
    pub version: ProtocolVersion,
    pub log_tokens: bool,
}

/// A bound decoy socket, ready to serve connections.
pub struct DecoyListener {
    listener: TcpListener,
    version: ProtocolVersion,
    log_tokens: bool,
}

impl DecoyListener {
    /// Binds the configured address and reports where we ended up, which
    /// matters when the port was 0.
    pub async fn bind(settings: &DecoySettings) -> Result<Self, std::io::Error> {
        let listener = TcpListener::bind(&settings.bind_address).await?;
        let listener = DecoyListener {
            listener,
            version: settings.version,
            log_tokens: settings.log_tokens,
        };
        info!("Listening on {}", listener.local_addr()?);
        Ok(listener)
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    /// Serves connections forever, one responder task each. Captured pairs
    /// go to `sink`; everything else is only logged.
    pub async fn run<K>(self, sink: Arc<Mutex<K>>) -> Result<(), std::io::Error>
    where
        K: LineSink + Send + 'static,
    {
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let sink = Arc::clone(&sink);
            let version = self.version;
            let log_tokens = self.log_tokens;
            tokio::spawn(async move {
                handle_connection(stream, peer, version, log_tokens, sink).await;
            });
        }
    }
}

/// Runs one capture exchange and records its outcome.
///
/// The stream stays open until the capture line is in the sink, so a
/// client that reads until EOF can rely on its pair being recorded.
async fn handle_connection<K: LineSink>(
    mut stream: TcpStream,
    peer: SocketAddr,
    version: ProtocolVersion,
    log_tokens: bool,
    sink: Arc<Mutex<K>>,
) {
    match capture(&mut stream, version).await {
        Ok(CaptureOutcome::Captured {
            challenge,
            response,
        }) => {
            let line = if log_tokens {
                format_token(&challenge, &response)
            } else {
                format!(
                    "{} {} {}",
                    peer,
                    hex::encode_upper(challenge),
                    hex::encode_upper(response)
                )
            };
            if let Err(e) = sink.lock().await.write_line(&line).await {
                error!("Unable to record capture from {}: {}", peer, e);
            }
        }
        Ok(CaptureOutcome::Incomplete { partial }) => {
            info!(
                "{} Received incomplete auth response: {}",
                peer,
                hex::encode_upper(&partial)
            );
        }
        Ok(CaptureOutcome::BadVersion { version }) => {
            info!("{} Received bad version {:?}", peer, version);
        }
        Ok(CaptureOutcome::WrongSecurityType { requested }) => {
            info!("{} Accepted unsupported security type {}", peer, requested);
        }
        Err(e) => {
            info!("{} {}", peer, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tokio::sync::Mutex;

    use crate::crypto::password::Password;
    use crate::decoy::listener::{DecoyListener, DecoySettings};
    use crate::lines::service::MemoryLineSink;
    use crate::protocol::rfb::ProtocolVersion;

    async fn start_decoy(log_tokens: bool) -> (String, Arc<Mutex<MemoryLineSink>>) {
        let settings = DecoySettings {
            bind_address: "127.0.0.1:0".to_string(),
            version: ProtocolVersion::V3_8,
            log_tokens,
        };
        let listener = DecoyListener::bind(&settings).await.unwrap();
        let addr = listener.local_addr().unwrap().to_string();
        let sink = Arc::new(Mutex::new(MemoryLineSink::new()));
        let run_sink = Arc::clone(&sink);
        tokio::spawn(async move {
            let _ = listener.run(run_sink).await;
        });
        (addr, sink)
    }

    async fn read_to_eof(stream: &mut TcpStream) {
        let mut scratch = [0u8; 64];
        while stream.read(&mut scratch).await.unwrap() != 0 {}
    }

    #[actix_rt::test]
    async fn captured_pairs_reach_the_sink_as_tokens() {
        let (addr, sink) = start_decoy(true).await;
        let mut stream = TcpStream::connect(&addr).await.unwrap();

        let mut version = [0u8; 12];
        stream.read_exact(&mut version).await.unwrap();
        stream.write_all(&version).await.unwrap();
        let mut types = [0u8; 2];
        stream.read_exact(&mut types).await.unwrap();
        stream.write_all(&[2]).await.unwrap();
        let mut challenge = [0u8; 16];
        stream.read_exact(&mut challenge).await.unwrap();
        let response = Password::new("kitten").cipher().encrypt(&challenge);
        stream.write_all(&response).await.unwrap();

        // EOF means the responder is done and the sink is settled.
        read_to_eof(&mut stream).await;

        assert_eq!(
            sink.lock().await.lines,
            vec![
                "$vnc$*00000000000000000000000000000000*7909B24AE2F2EDC97909B24AE2F2EDC9"
                    .to_string()
            ]
        );
    }

    #[actix_rt::test]
    async fn short_responses_are_logged_but_never_recorded() {
        let (addr, sink) = start_decoy(true).await;
        let mut stream = TcpStream::connect(&addr).await.unwrap();

        let mut version = [0u8; 12];
        stream.read_exact(&mut version).await.unwrap();
        stream.write_all(&version).await.unwrap();
        let mut types = [0u8; 2];
        stream.read_exact(&mut types).await.unwrap();
        stream.write_all(&[2]).await.unwrap();
        let mut challenge = [0u8; 16];
        stream.read_exact(&mut challenge).await.unwrap();

        stream.write_all(&[0xCD; 5]).await.unwrap();
        stream.shutdown().await.unwrap();
        read_to_eof(&mut stream).await;

        assert!(sink.lock().await.lines.is_empty());
    }

    #[actix_rt::test]
    async fn plain_capture_lines_name_the_peer() {
        let (addr, sink) = start_decoy(false).await;
        let mut stream = TcpStream::connect(&addr).await.unwrap();
        let local = stream.local_addr().unwrap().to_string();

        let mut version = [0u8; 12];
        stream.read_exact(&mut version).await.unwrap();
        stream.write_all(&version).await.unwrap();
        let mut types = [0u8; 2];
        stream.read_exact(&mut types).await.unwrap();
        stream.write_all(&[2]).await.unwrap();
        let mut challenge = [0u8; 16];
        stream.read_exact(&mut challenge).await.unwrap();
        stream.write_all(&[0xEE; 16]).await.unwrap();

        read_to_eof(&mut stream).await;

        let lines = sink.lock().await.lines.clone();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with(&local));
        assert!(lines[0].ends_with(&"EE".repeat(16)));
    }
}
