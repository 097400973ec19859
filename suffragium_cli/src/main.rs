use clap::{App, AppSettings, Arg, SubCommand};
use ed25519_dalek::SecretKey;

#[macro_use]
extern crate log;

mod command_keygen;
mod command_simulate;
mod command_tx;
mod config;

use command_keygen::command_keygen;
use command_simulate::command_simulate;
use command_tx::command_tx;

fn main() {
    let matches = App::new("Suffragium CLI")
        .version("0.1")
        .about("Builds and replays Suffragium voting transactions")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("v")
                .short("v")
                .multiple(true)
                .global(true)
                .help("Sets the level of verbosity"),
        )
        .arg(
            Arg::with_name("secret-key")
                .long("secret-key")
                .takes_value(true)
                .global(true)
                .help("Hex secret key used to sign transactions - can also be set with SUFFRAGIUM_SECRET_KEY"),
        )
        .subcommand(SubCommand::with_name("keygen").about("Generate a new ed25519 keypair"))
        .subcommand(
            SubCommand::with_name("tx")
                .about("Build and sign a transaction, printing it as JSON")
                .setting(AppSettings::SubcommandRequiredElseHelp)
                .subcommand(
                    SubCommand::with_name("create-vote")
                        .about("Open a new vote")
                        .arg(
                            Arg::with_name("end-block")
                                .long("end-block")
                                .takes_value(true)
                                .required(true)
                                .help("First block at which ballots are no longer accepted"),
                        )
                        .arg(
                            Arg::with_name("description")
                                .long("description")
                                .takes_value(true)
                                .default_value("")
                                .help("Free-form description of the proposal"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("cast-vote")
                        .about("Cast an encrypted ballot")
                        .arg(
                            Arg::with_name("VOTE-ID")
                                .index(1)
                                .required(true)
                                .help("Vote to cast the ballot in"),
                        )
                        .arg(
                            Arg::with_name("handle")
                                .long("handle")
                                .takes_value(true)
                                .required(true)
                                .help("Ciphertext handle of the encrypted ballot (hex)"),
                        )
                        .arg(
                            Arg::with_name("input-proof")
                                .long("input-proof")
                                .takes_value(true)
                                .required(true)
                                .help("Input proof binding the ballot to the contract and sender (hex)"),
                        )
                        .arg(
                            Arg::with_name("public-values")
                                .long("public-values")
                                .takes_value(true)
                                .required(true)
                                .help("Encoded public values of the identity proof (hex), or @FILE with them as JSON"),
                        )
                        .arg(
                            Arg::with_name("proof")
                                .long("proof")
                                .takes_value(true)
                                .required(true)
                                .help("Identity proof (hex)"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("reveal")
                        .about("Request the reveal of a closed vote")
                        .arg(Arg::with_name("VOTE-ID").index(1).required(true)),
                )
                .subcommand(
                    SubCommand::with_name("set-quorum")
                        .about("Change the minimum quorum (owner only)")
                        .arg(
                            Arg::with_name("QUORUM")
                                .index(1)
                                .required(true)
                                .help("Quorum as a percentage, e.g. 50 or 66.5"),
                        ),
                )
                .subcommand(
                    SubCommand::with_name("callback")
                        .about("Deliver a decrypted result (oracle only)")
                        .arg(
                            Arg::with_name("token")
                                .long("token")
                                .takes_value(true)
                                .required(true)
                                .help("Token of the decryption request"),
                        )
                        .arg(
                            Arg::with_name("passed")
                                .long("passed")
                                .takes_value(true)
                                .required(true)
                                .possible_values(&["true", "false"])
                                .help("Decrypted decision"),
                        ),
                ),
        )
        .subcommand(
            SubCommand::with_name("simulate")
                .about("Replay a scenario against an in-memory ledger")
                .arg(
                    Arg::with_name("INPUT")
                        .index(1)
                        .required(true)
                        .help("Scenario file in JSON format"),
                )
                .arg(
                    Arg::with_name("attestation")
                        .long("attestation")
                        .help("Check identity proofs as email attestations instead of accepting them all"),
                ),
        )
        .get_matches();

    let default_level = match matches.occurrences_of("v") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    init_logging(default_level);

    let secret_key = secret_key(matches.value_of("secret-key"));

    // Subcommands
    if let Some(matches) = matches.subcommand_matches("keygen") {
        command_keygen(matches);
        std::process::exit(0);
    }

    if let Some(matches) = matches.subcommand_matches("tx") {
        command_tx(matches, secret_key.as_ref());
        std::process::exit(0);
    }

    if let Some(matches) = matches.subcommand_matches("simulate") {
        command_simulate(matches);
        std::process::exit(0);
    }
}

fn secret_key(arg: Option<&str>) -> Option<SecretKey> {
    let env_var = std::env::var("SUFFRAGIUM_SECRET_KEY").ok();
    let hex_key = arg.map(|s| s.to_owned()).or(env_var)?;

    match config::parse_secret_key(&hex_key) {
        Ok(key) => Some(key),
        Err(e) => {
            eprintln!("suffragium: invalid secret key: {}", e);
            std::process::exit(1);
        }
    }
}

/// Log to stderr, filtered by `RUST_LOG` when set
fn init_logging(default_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

pub fn expand(filename: &str) -> String {
    shellexpand::tilde(filename).into_owned()
}
