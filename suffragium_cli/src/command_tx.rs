use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use suffragium::*;

pub fn command_tx(matches: &clap::ArgMatches, secret_key: Option<&SecretKey>) {
    let secret_key = secret_key.unwrap_or_else(|| {
        eprintln!("Please provide a secret key either via --secret-key or SUFFRAGIUM_SECRET_KEY");
        std::process::exit(1);
    });
    let sender: PublicKey = secret_key.into();

    let tx: Transaction = match matches.subcommand() {
        ("create-vote", Some(matches)) => CreateVoteTransaction {
            sender,
            end_block: parse_arg(matches, "end-block"),
            description: matches.value_of("description").unwrap_or("").to_string(),
        }
        .into(),
        ("cast-vote", Some(matches)) => CastVoteTransaction {
            sender,
            vote_id: parse_arg(matches, "VOTE-ID"),
            ballot: EncryptedInput {
                handle: hex_arg32(matches, "handle"),
                proof: hex_arg(matches, "input-proof"),
            },
            public_values: public_values_arg(matches),
            proof: hex_arg(matches, "proof"),
        }
        .into(),
        ("reveal", Some(matches)) => RequestRevealTransaction {
            sender,
            vote_id: parse_arg(matches, "VOTE-ID"),
        }
        .into(),
        ("set-quorum", Some(matches)) => {
            let quorum = matches.value_of("QUORUM").unwrap_or_default();
            let min_quorum = crate::config::parse_quorum(quorum).unwrap_or_else(|e| {
                eprintln!("suffragium tx: {}", e);
                std::process::exit(1);
            });
            SetMinQuorumTransaction { sender, min_quorum }.into()
        }
        ("callback", Some(matches)) => DecryptionCallbackTransaction {
            sender,
            token: DecryptionToken(parse_arg(matches, "token")),
            cleartexts: vec![Cleartext::Bool(parse_arg(matches, "passed"))],
        }
        .into(),
        _ => {
            eprintln!("suffragium tx: unknown transaction type");
            std::process::exit(1);
        }
    };

    info!("signing {} transaction as {}", tx.transaction_type(), Address::from(&sender));
    let tx = tx.sign(secret_key).unwrap_or_else(|e| {
        eprintln!("suffragium tx: unable to sign transaction: {}", e);
        std::process::exit(1);
    });

    match serde_json::to_string_pretty(&tx) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("suffragium tx: unable to serialize transaction: {}", e);
            std::process::exit(1);
        }
    }
}

fn parse_arg<T>(matches: &clap::ArgMatches, name: &str) -> T
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = matches.value_of(name).unwrap_or_default();
    value.parse().unwrap_or_else(|e| {
        eprintln!("suffragium tx: invalid {} {}: {}", name, value, e);
        std::process::exit(1);
    })
}

fn hex_arg(matches: &clap::ArgMatches, name: &str) -> Vec<u8> {
    let value = matches.value_of(name).unwrap_or_default();
    let value = value.strip_prefix("0x").unwrap_or(value);
    hex::decode(value).unwrap_or_else(|e| {
        eprintln!("suffragium tx: invalid hex for {}: {}", name, e);
        std::process::exit(1);
    })
}

fn hex_arg32(matches: &clap::ArgMatches, name: &str) -> [u8; 32] {
    parse_bytes32(matches.value_of(name).unwrap_or_default()).unwrap_or_else(|e| {
        eprintln!("suffragium tx: invalid {}: {}", name, e);
        std::process::exit(1);
    })
}

// Hex-encoded words, or `@FILE` holding the public values as JSON
fn public_values_arg(matches: &clap::ArgMatches) -> Vec<u8> {
    let value = matches.value_of("public-values").unwrap_or_default();

    let bytes = match value.strip_prefix('@') {
        Some(filename) => {
            let filename = crate::expand(filename);
            let json = std::fs::read(&filename).unwrap_or_else(|e| {
                eprintln!("suffragium tx: unable to read {}: {}", filename, e);
                std::process::exit(1);
            });
            let public_values: PublicValues = serde_json::from_slice(&json).unwrap_or_else(|e| {
                eprintln!("suffragium tx: unable to read {}: {}", filename, e);
                std::process::exit(1);
            });
            public_values.to_bytes()
        }
        None => hex_arg(matches, "public-values"),
    };

    if PublicValues::from_bytes(&bytes).is_err() {
        warn!(
            "public values are not {} bytes of well-formed words, the ledger will reject them",
            PUBLIC_VALUES_LEN
        );
    }
    bytes
}
