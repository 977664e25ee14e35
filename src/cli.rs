//! Command line surface of the audit toolkit

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "rust-vnc-audit",
    about = "VNC authentication audit toolkit",
    version,
    long_about = "Audit toolkit for the VNC challenge/response scheme: cracks captured handshakes of the form $vnc$*challenge*response offline, generates authentication attempts against live servers, and runs a protocol-emulating listener that records the attempts made against it. Defaults for every knob live in application.toml; command line options override them."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crack captured VNC handshakes against a wordlist
    Crack {
        /// Handshake files of $vnc$*challenge*response tokens (- or none for stdin)
        files: Vec<String>,

        /// Extra handshake tokens given directly on the command line
        #[arg(long = "token")]
        tokens: Vec<String>,

        /// Wordlist file with candidate passwords (- for stdin)
        #[arg(short, long)]
        wordlist: Option<String>,

        /// Pot file of known pairs, read before the wordlist and appended to on finds
        #[arg(short, long)]
        pot: Option<String>,

        /// Print handshakes which were not cracked
        #[arg(short = 'f', long = "not-found", default_value_t = false)]
        not_found: bool,
    },

    /// Generate authentication attempts against the given servers
    Attack {
        /// Servers to attack, as host or host:port
        targets: Vec<String>,

        /// Optional file from which to read hosts, one per line
        #[arg(long)]
        hosts: Option<String>,

        /// Name of file with VNC passwords (- for stdin)
        #[arg(short, long)]
        wordlist: Option<String>,

        /// Attempt to authenticate to this many hosts in parallel
        #[arg(long)]
        parallel: Option<u32>,

        /// Default VNC port for targets given without one
        #[arg(long)]
        port: Option<u16>,

        /// Stop authenticating to a host after a successful authentication
        #[arg(long, default_value_t = false)]
        stop: bool,

        /// Print failed auth attempts
        #[arg(long, default_value_t = false)]
        fails: bool,
    },

    /// Listen for VNC connections and log the auth attempts made against us
    Listen {
        /// Listen address
        #[arg(short = 'a', long)]
        address: Option<String>,

        /// Protocol version to emulate, 3.8 or 3.3
        #[arg(long)]
        protocol: Option<String>,

        /// Record captures as crackable $vnc$ tokens instead of peer-tagged hex
        #[arg(long, default_value_t = false)]
        tokens: bool,
    },
}
