//! Fixed-size worker pool draining a shared target queue.

use std::sync::Arc;

use log::info;
use tokio::sync::{mpsc, Mutex};

use crate::attacker::session::{attack_host, AttackSettings};
use crate::attacker::target::ensure_port;
use crate::crypto::password::Password;

/// Runs the whole attack: queues every target, spawns the workers, and
/// waits for the queue to drain.
///
/// Targets are picked up in queue order but finish in whatever order the
/// sessions happen to take.
pub async fn run_pool(targets: Vec<String>, passwords: Vec<Password>, settings: AttackSettings) {
    let (tx, rx) = mpsc::unbounded_channel();
    for target in targets {
        // Send only fails once every receiver is gone; rx outlives this.
        let _ = tx.send(target);
    }
    drop(tx);

    let rx = Arc::new(Mutex::new(rx));
    let passwords = Arc::new(passwords);
    let settings = Arc::new(settings);

    let mut workers = Vec::with_capacity(settings.parallel);
    for _ in 0..settings.parallel {
        let rx = Arc::clone(&rx);
        let passwords = Arc::clone(&passwords);
        let settings = Arc::clone(&settings);

        workers.push(tokio::spawn(async move {
            loop {
                let target = {
                    let mut guard = rx.lock().await;
                    guard.recv().await
                };
                let Some(target) = target else {
                    break;
                };

                let target = ensure_port(&target, settings.default_port);
                attack_host(&target, &passwords, &settings).await;
            }
        }));
    }

    for worker in workers {
        let _ = worker.await;
    }
    info!("Done.");
}
