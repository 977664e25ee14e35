//! This application is a VNC authentication audit toolkit with three jobs:
//! - cracking captured challenge/response handshakes offline (see [cracker])
//! - generating authentication attempts against live servers (see [attacker])
//! - luring scanners with a protocol-emulating decoy listener (see [decoy])
//! - logging
//!
//! # Startup
//! To start the application the following steps have to be done.
//! 1. Configure the config file that can be found in ```<path-to-project>/application.toml```
//! 2. (optional) Configure the settings for the logging framework via ```<path-to-project>/log4rs.yml```
//! 3. Run one of the subcommands: ```crack```, ```attack``` or ```listen```
//!
//! Result lines (FOUND, POT, NOTFOUND and the listener's capture records) go
//! to stdout so they can be piped into other tools; everything else goes
//! through the logging framework.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use clap::Parser;
use log::info;
use tokio::sync::Mutex;

use crate::attacker::pool::run_pool;
use crate::attacker::session::AttackSettings;
use crate::attacker::target::TargetList;
use crate::cli::{Cli, Commands};
use crate::configuration::config::{get_config, Config};
use crate::cracker::matcher::Matcher;
use crate::cracker::token::TokenScanner;
use crate::crypto::password::read_passwords;
use crate::decoy::listener::{DecoyListener, DecoySettings};
use crate::lines::service::{FileLineSink, FileLineSource, InputLineSource, StdoutLineSink};
use crate::protocol::rfb::ProtocolVersion;

mod attacker;
mod cli;
mod configuration;
mod cracker;
mod crypto;
mod decoy;
mod lines;
mod protocol;

/// Initializes the logging framework and dispatches to the selected subcommand
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    log4rs::init_file("log4rs.yml", Default::default()).expect("Error deserializing log4rs!");

    let config = get_config();
    match Cli::parse().command {
        Commands::Crack {
            files,
            tokens,
            wordlist,
            pot,
            not_found,
        } => run_crack(&config, files, tokens, wordlist, pot, not_found).await,
        Commands::Attack {
            targets,
            hosts,
            wordlist,
            parallel,
            port,
            stop,
            fails,
        } => run_attack(&config, targets, hosts, wordlist, parallel, port, stop, fails).await,
        Commands::Listen {
            address,
            protocol,
            tokens,
        } => run_listen(&config, address, protocol, tokens).await,
    }
}

/// Runs the offline cracker: collects handshakes from token arguments and
/// files, replays the pot file, then walks the wordlist.
async fn run_crack(
    config: &Config,
    files: Vec<String>,
    tokens: Vec<String>,
    wordlist: Option<String>,
    pot: Option<String>,
    not_found: bool,
) -> anyhow::Result<()> {
    let wordlist_name = wordlist.unwrap_or_else(|| config.cracker_wordlist.clone());
    let pot_name = pot.unwrap_or_else(|| config.cracker_pot_file.clone());
    let print_not_found = not_found || config.cracker_print_not_found;

    // Make sure the pot file is usable before any cracking work happens.
    let mut pot_sink = None;
    let mut pot_lines = None;
    if !pot_name.is_empty() {
        pot_sink = Some(
            FileLineSink::open_append(&pot_name)
                .await
                .with_context(|| format!("Unable to open potfile {} for updating", pot_name))?,
        );
        pot_lines = Some(
            FileLineSource::open(&pot_name)
                .await
                .with_context(|| format!("Unable to open potfile {} for reading", pot_name))?,
        );
        info!("Opened potfile {}", pot_name);
    }

    let mut matcher = Matcher::new();
    let mut total = 0;

    let scanner = TokenScanner::new();
    for token in &tokens {
        let (challenge, response) = scanner.parse_token(token)?;
        if matcher.add(challenge, response) {
            total += 1;
        }
    }

    let mut names = files;
    if names.is_empty() {
        names.push("-".to_string());
    }
    for name in &names {
        let shown = InputLineSource::describe(name);
        let mut source = InputLineSource::open(name)
            .await
            .with_context(|| format!("Unable to read handshakes from {}", shown))?;
        let read = matcher
            .read_handshakes(&mut source)
            .await
            .with_context(|| format!("Unable to read handshakes from {}", shown))?;
        info!("Read {} handshakes from {}", read, shown);
        total += read;
    }
    if total == 0 {
        bail!("No handshakes to crack");
    }
    info!("Attempting to crack {} handshakes", total);

    let mut results = StdoutLineSink::new();
    let mut cracked = 0;

    // Remove the pairs solved in an earlier run.
    if let Some(mut pot) = pot_lines {
        cracked += matcher
            .check_pot(&mut pot, &mut results)
            .await
            .context("Unable to check handshakes against potfile")?;
        if matcher.is_empty() {
            info!("Found passwords for {}/{} handshakes", cracked, total);
            return Ok(());
        }
    }

    let shown = InputLineSource::describe(&wordlist_name);
    let mut words = InputLineSource::open(&wordlist_name)
        .await
        .with_context(|| format!("Unable to open wordlist {}", shown))?;
    cracked += matcher
        .crack(&mut words, pot_sink.as_mut(), &mut results)
        .await?;

    if print_not_found {
        matcher.report_uncracked(&mut results).await?;
    }
    info!("Found passwords for {}/{} handshakes", cracked, total);
    Ok(())
}

/// Runs the online tester against every named target.
#[allow(clippy::too_many_arguments)]
async fn run_attack(
    config: &Config,
    targets: Vec<String>,
    hosts: Option<String>,
    wordlist: Option<String>,
    parallel: Option<u32>,
    port: Option<u16>,
    stop: bool,
    fails: bool,
) -> anyhow::Result<()> {
    let mut list = TargetList::new();
    for target in &targets {
        list.add(target);
    }
    if let Some(hosts_file) = &hosts {
        let mut source = FileLineSource::open(hosts_file)
            .await
            .with_context(|| format!("Unable to parse hosts from {}", hosts_file))?;
        list.extend_from(&mut source)
            .await
            .with_context(|| format!("Unable to parse hosts from {}", hosts_file))?;
    }
    if list.is_empty() {
        bail!("No targets");
    }
    info!("Will authenticate to {} hosts", list.len());

    let wordlist_name = wordlist.unwrap_or_else(|| config.attack_wordlist.clone());
    let shown = InputLineSource::describe(&wordlist_name);
    let mut words = InputLineSource::open(&wordlist_name)
        .await
        .context("Unable to read wordlist")?;
    let passwords = read_passwords(&mut words, config.attack_log_duplicate_passwords)
        .await
        .context("Unable to read wordlist")?;
    if passwords.is_empty() {
        bail!("Did not find any passwords in {}", shown);
    }
    info!("Read {} passwords from {}", passwords.len(), shown);

    let settings = AttackSettings {
        parallel: parallel.unwrap_or(config.attack_parallel) as usize,
        default_port: port.unwrap_or(config.attack_default_port),
        dial_timeout: Duration::from_secs(config.attack_dial_timeout_secs),
        handshake_timeout: Duration::from_secs(config.attack_handshake_timeout_secs),
        attempt_pause: Duration::from_millis(config.attack_attempt_pause_ms),
        rejection_pause: Duration::from_secs(config.attack_rejection_pause_secs),
        stop_on_success: stop || config.attack_stop_on_success,
        log_failures: fails || config.attack_log_failures,
    };
    if settings.parallel == 0 {
        bail!("Must attack at least 1 host (--parallel)");
    }

    run_pool(list.into_vec(), passwords, settings).await;
    Ok(())
}

/// Binds the decoy listener and serves connections until killed.
async fn run_listen(
    config: &Config,
    address: Option<String>,
    protocol: Option<String>,
    tokens: bool,
) -> anyhow::Result<()> {
    let version_name = protocol.unwrap_or_else(|| config.listener_protocol_version.clone());
    let version = ProtocolVersion::from_str(&version_name).with_context(|| {
        format!(
            "Unknown protocol version {:?}, expected 3.8 or 3.3",
            version_name
        )
    })?;

    let settings = DecoySettings {
        bind_address: address.unwrap_or_else(|| config.listener_bind_address.clone()),
        version,
        log_tokens: tokens || config.listener_log_tokens,
    };
    let listener = DecoyListener::bind(&settings)
        .await
        .with_context(|| format!("Unable to listen on {}", settings.bind_address))?;

    let sink = Arc::new(Mutex::new(StdoutLineSink::new()));
    listener
        .run(sink)
        .await
        .context("Unable to accept new connections")?;
    Ok(())
}
