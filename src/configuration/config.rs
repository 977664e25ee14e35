//! Reads the configuration file and creates a global [Config] object. Manages default values and errors
use std::fs;
use std::io::Error as IoError;

use log::warn;
use serde::{Deserialize, Serialize};
use toml;

#[derive(Serialize, Deserialize, Debug)]
/// Represents the decoy listener settings
struct ConfigTomlListener {
    bind_address: Option<String>,
    protocol_version: Option<String>,
    log_tokens: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug)]
/// Represents the online attack settings
struct ConfigTomlAttack {
    wordlist: Option<String>,
    parallel: Option<u32>,
    default_port: Option<u16>,
    dial_timeout_secs: Option<u64>,
    handshake_timeout_secs: Option<u64>,
    attempt_pause_ms: Option<u64>,
    rejection_pause_secs: Option<u64>,
    stop_on_success: Option<bool>,
    log_failures: Option<bool>,
    log_duplicate_passwords: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug)]
/// Represents the offline cracker settings
struct ConfigTomlCracker {
    wordlist: Option<String>,
    pot_file: Option<String>,
    print_not_found: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug)]
/// Represents the full config settings
struct ConfigToml {
    listener: Option<ConfigTomlListener>,
    attack: Option<ConfigTomlAttack>,
    cracker: Option<ConfigTomlCracker>,
}

#[derive(Debug)]
/// Represents the full configuration
pub struct Config {
    pub listener_bind_address: String,
    pub listener_protocol_version: String,
    pub listener_log_tokens: bool,
    pub attack_wordlist: String,
    pub attack_parallel: u32,
    pub attack_default_port: u16,
    pub attack_dial_timeout_secs: u64,
    pub attack_handshake_timeout_secs: u64,
    pub attack_attempt_pause_ms: u64,
    pub attack_rejection_pause_secs: u64,
    pub attack_stop_on_success: bool,
    pub attack_log_failures: bool,
    pub attack_log_duplicate_passwords: bool,
    pub cracker_wordlist: String,
    pub cracker_pot_file: String,
    pub cracker_print_not_found: bool,
}

/// Creates a config with [Config::new] and the default file name 'application.toml'.
pub fn get_config() -> Config {
    Config::new("application.toml")
}

impl Config {
    /// Searches for a file in the base path of the application and tries
    /// to parse it to a valid [Config].
    ///
    /// If the file or specific values are missing or invalid, they will be replaced with default
    /// values.
    /// * `location` - Name of the file that is searched for
    pub fn new(location: &str) -> Self {
        let config_filepaths: [&str; 1] = [location];

        let mut content: String = "".to_owned();

        for filepath in config_filepaths {
            let result: Result<String, IoError> = fs::read_to_string(filepath);

            if let Ok(..) = result {
                content = result.unwrap();
                break;
            }
        }

        let config_toml: ConfigToml = toml::from_str(&content).unwrap_or_else(|_| {
            warn!(
                "Configuration setup: Failed to create ConfigToml Object out of config file. \
                Check if the file exists in the given directory and is formatted correctly!"
            );
            ConfigToml {
                listener: None,
                attack: None,
                cracker: None,
            }
        });

        let (listener_bind_address, listener_protocol_version, listener_log_tokens): (
            String,
            String,
            bool,
        ) = match config_toml.listener {
            Some(listener) => {
                let bind_address = listener.bind_address.unwrap_or_else(|| {
                    warn!("Configuration setup: Missing field bind_address in listener data.");
                    "0.0.0.0:5900".to_owned()
                });

                let protocol_version = listener.protocol_version.unwrap_or_else(|| {
                    warn!("Configuration setup: Missing field protocol_version in listener data.");
                    "3.8".to_owned()
                });

                let log_tokens = listener.log_tokens.unwrap_or_else(|| {
                    warn!("Configuration setup: Missing field log_tokens in listener data.");
                    false.to_owned()
                });

                (bind_address, protocol_version, log_tokens)
            }
            None => {
                warn!("Configuration setup: Missing listener data.");
                ("0.0.0.0:5900".to_owned(), "3.8".to_owned(), false.to_owned())
            }
        };

        let (
            attack_wordlist,
            attack_parallel,
            attack_default_port,
            attack_dial_timeout_secs,
            attack_handshake_timeout_secs,
            attack_attempt_pause_ms,
            attack_rejection_pause_secs,
            attack_stop_on_success,
            attack_log_failures,
            attack_log_duplicate_passwords,
        ): (String, u32, u16, u64, u64, u64, u64, bool, bool, bool) = match config_toml.attack {
            Some(attack) => {
                let wordlist = attack.wordlist.unwrap_or_else(|| {
                    warn!("Configuration setup: Missing field wordlist in attack data.");
                    "-".to_owned()
                });

                let parallel = attack.parallel.unwrap_or_else(|| {
                    warn!("Configuration setup: Missing field parallel in attack data.");
                    128.to_owned()
                });

                let default_port = attack.default_port.unwrap_or_else(|| {
                    warn!("Configuration setup: Missing field default_port in attack data.");
                    5900.to_owned()
                });

                let dial_timeout_secs = attack.dial_timeout_secs.unwrap_or_else(|| {
                    warn!("Configuration setup: Missing field dial_timeout_secs in attack data.");
                    30.to_owned()
                });

                let handshake_timeout_secs = attack.handshake_timeout_secs.unwrap_or_else(|| {
                    warn!(
                        "Configuration setup: Missing field handshake_timeout_secs in attack data."
                    );
                    30.to_owned()
                });

                let attempt_pause_ms = attack.attempt_pause_ms.unwrap_or_else(|| {
                    warn!("Configuration setup: Missing field attempt_pause_ms in attack data.");
                    1500.to_owned()
                });

                let rejection_pause_secs = attack.rejection_pause_secs.unwrap_or_else(|| {
                    warn!(
                        "Configuration setup: Missing field rejection_pause_secs in attack data."
                    );
                    30.to_owned()
                });

                let stop_on_success = attack.stop_on_success.unwrap_or_else(|| {
                    warn!("Configuration setup: Missing field stop_on_success in attack data.");
                    false.to_owned()
                });

                let log_failures = attack.log_failures.unwrap_or_else(|| {
                    warn!("Configuration setup: Missing field log_failures in attack data.");
                    false.to_owned()
                });

                let log_duplicate_passwords = attack.log_duplicate_passwords.unwrap_or_else(|| {
                    warn!(
                        "Configuration setup: Missing field log_duplicate_passwords in attack data."
                    );
                    true.to_owned()
                });

                (
                    wordlist,
                    parallel,
                    default_port,
                    dial_timeout_secs,
                    handshake_timeout_secs,
                    attempt_pause_ms,
                    rejection_pause_secs,
                    stop_on_success,
                    log_failures,
                    log_duplicate_passwords,
                )
            }
            None => {
                warn!("Configuration setup: Missing attack data.");
                (
                    "-".to_owned(),
                    128.to_owned(),
                    5900.to_owned(),
                    30.to_owned(),
                    30.to_owned(),
                    1500.to_owned(),
                    30.to_owned(),
                    false.to_owned(),
                    false.to_owned(),
                    true.to_owned(),
                )
            }
        };

        let (cracker_wordlist, cracker_pot_file, cracker_print_not_found): (String, String, bool) =
            match config_toml.cracker {
                Some(cracker) => {
                    let wordlist = cracker.wordlist.unwrap_or_else(|| {
                        warn!("Configuration setup: Missing field wordlist in cracker data.");
                        "rockyou.txt".to_owned()
                    });

                    let pot_file = cracker.pot_file.unwrap_or_else(|| {
                        warn!("Configuration setup: Missing field pot_file in cracker data.");
                        "".to_owned()
                    });

                    let print_not_found = cracker.print_not_found.unwrap_or_else(|| {
                        warn!(
                            "Configuration setup: Missing field print_not_found in cracker data."
                        );
                        false.to_owned()
                    });

                    (wordlist, pot_file, print_not_found)
                }
                None => {
                    warn!("Configuration setup: Missing cracker data.");
                    ("rockyou.txt".to_owned(), "".to_owned(), false.to_owned())
                }
            };

        Config {
            listener_bind_address,
            listener_protocol_version,
            listener_log_tokens,
            attack_wordlist,
            attack_parallel,
            attack_default_port,
            attack_dial_timeout_secs,
            attack_handshake_timeout_secs,
            attack_attempt_pause_ms,
            attack_rejection_pause_secs,
            attack_stop_on_success,
            attack_log_failures,
            attack_log_duplicate_passwords,
            cracker_wordlist,
            cracker_pot_file,
            cracker_print_not_found,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::configuration::config::Config;

    #[test]
    fn invalid_config_path() {
        let path = "invalid.toml";
        let config = Config::new(path);
        assert_eq!(config.listener_bind_address, "0.0.0.0:5900");
        assert_eq!(config.listener_protocol_version, "3.8");
        assert!(!config.listener_log_tokens);
        assert_eq!(config.attack_wordlist, "-");
        assert_eq!(config.attack_parallel, 128);
        assert_eq!(config.attack_default_port, 5900);
        assert_eq!(config.attack_dial_timeout_secs, 30);
        assert_eq!(config.attack_handshake_timeout_secs, 30);
        assert_eq!(config.attack_attempt_pause_ms, 1500);
        assert_eq!(config.attack_rejection_pause_secs, 30);
        assert!(!config.attack_stop_on_success);
        assert!(!config.attack_log_failures);
        assert!(config.attack_log_duplicate_passwords);
        assert_eq!(config.cracker_wordlist, "rockyou.txt");
        assert_eq!(config.cracker_pot_file, "");
        assert!(!config.cracker_print_not_found);
    }

    #[test]
    fn valid_config_path_and_values() {
        let path = "application-test.toml";
        let config = Config::new(path);
        assert_eq!(config.listener_bind_address, "127.0.0.1:5999");
        assert_eq!(config.listener_protocol_version, "3.3");
        assert!(config.listener_log_tokens);
        assert_eq!(config.attack_wordlist, "words-test.txt");
        assert_eq!(config.attack_parallel, 4);
        assert_eq!(config.attack_default_port, 5901);
        assert_eq!(config.attack_dial_timeout_secs, 2);
        assert_eq!(config.attack_handshake_timeout_secs, 3);
        assert_eq!(config.attack_attempt_pause_ms, 10);
        assert_eq!(config.attack_rejection_pause_secs, 1);
        assert!(config.attack_stop_on_success);
        assert!(config.attack_log_failures);
        assert!(!config.attack_log_duplicate_passwords);
        assert_eq!(config.cracker_wordlist, "crack-words-test.txt");
        assert_eq!(config.cracker_pot_file, "test.pot");
        assert!(config.cracker_print_not_found);
    }
}
