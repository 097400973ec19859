use serde::Deserialize;
use suffragium::mock::{MockRuntime, MockVerifier};
use suffragium::*;

/// A scenario replayed against an in-memory ledger
#[derive(Deserialize, Debug)]
struct Scenario {
    /// Ledger configuration; read from the environment when absent
    #[serde(default)]
    config: Option<Config>,
    steps: Vec<Step>,
}

#[derive(Deserialize, Debug)]
#[serde(tag = "step")]
#[serde(rename_all = "snake_case")]
enum Step {
    /// A signed transaction included at `height`
    Transaction {
        height: u64,
        transaction: SignedTransaction,
    },

    /// Unsigned entry-point calls made by `sender`
    CreateVote {
        height: u64,
        sender: Address,
        end_block: u64,
        #[serde(default)]
        description: String,
    },
    SetMinQuorum {
        height: u64,
        sender: Address,
        min_quorum: u64,
    },
    Reveal {
        height: u64,
        sender: Address,
        vote_id: VoteId,
    },

    /// A ballot encrypted by the simulated runtime on behalf of `sender`, then cast
    Ballot {
        height: u64,
        vote_id: VoteId,
        sender: Address,
        ballot: u64,
        public_values: PublicValues,
        #[serde(default, with = "suffragium::hex_bytes")]
        proof: Vec<u8>,
    },

    /// The oracle answers every pending decryption request
    Decrypt { height: u64 },
}

impl Step {
    fn height(&self) -> u64 {
        match self {
            Step::Transaction { height, .. } => *height,
            Step::CreateVote { height, .. } => *height,
            Step::SetMinQuorum { height, .. } => *height,
            Step::Reveal { height, .. } => *height,
            Step::Ballot { height, .. } => *height,
            Step::Decrypt { height } => *height,
        }
    }
}

pub fn command_simulate(matches: &clap::ArgMatches) {
    let filename = crate::expand(matches.value_of("INPUT").unwrap_or_default());

    let file_bytes = match std::fs::read(&filename) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("suffragium simulate: unable to read {}: {}", &filename, e);
            std::process::exit(1);
        }
    };

    let scenario: Scenario = serde_json::from_slice(&file_bytes).unwrap_or_else(|e| {
        eprintln!("suffragium simulate: unable to read {}: {}", &filename, e);
        std::process::exit(1);
    });

    let Scenario { config, steps } = scenario;
    let config = match config {
        Some(config) => config,
        None => crate::config::config_from_env().unwrap_or_else(|e| {
            eprintln!("suffragium simulate: {}", e);
            std::process::exit(1);
        }),
    };

    let runtime = MockRuntime::default();
    let outcome = if matches.is_present("attestation") {
        Suffragium::new(config, AttestationVerifier, runtime).map(|l| {
            run(l, steps);
        })
    } else {
        Suffragium::new(config, MockVerifier::default(), runtime).map(|l| {
            run(l, steps);
        })
    };

    if let Err(e) = outcome {
        eprintln!("suffragium simulate: {}", e);
        std::process::exit(1);
    }
}

/// Replay `steps` in order, printing events and rejections as they happen
fn run<V: ProofVerifier>(
    mut ledger: Suffragium<V, MockRuntime>,
    steps: Vec<Step>,
) -> Suffragium<V, MockRuntime> {
    let mut height = 0;
    let mut rejected = 0;

    for (i, step) in steps.into_iter().enumerate() {
        if step.height() < height {
            warn!("step {} goes back in time from height {} to {}", i, height, step.height());
        }
        height = step.height();

        let first_event = ledger.events().len();
        let result = match step {
            Step::Transaction { transaction, .. } => ledger.apply(&transaction, height),
            Step::CreateVote {
                sender,
                end_block,
                description,
                ..
            } => ledger
                .create_vote(&Context::new(sender, height), end_block, description)
                .map(|_| ledger.events()[first_event..].to_vec()),
            Step::SetMinQuorum {
                sender, min_quorum, ..
            } => ledger
                .set_min_quorum(&Context::new(sender, height), min_quorum)
                .map(|_| vec![]),
            Step::Reveal {
                sender, vote_id, ..
            } => ledger
                .request_reveal_vote(&Context::new(sender, height), vote_id)
                .map(|token| {
                    info!("vote {} awaiting decryption {}", vote_id, token);
                    ledger.events()[first_event..].to_vec()
                }),
            Step::Ballot {
                vote_id,
                sender,
                ballot,
                public_values,
                proof,
                ..
            } => {
                let contract = ledger.config().contract;
                let input = ledger.runtime_mut().encrypt_input(ballot, &contract, &sender);
                ledger
                    .cast_vote(
                        &Context::new(sender, height),
                        vote_id,
                        &input,
                        &public_values.to_bytes(),
                        &proof,
                    )
                    .map(|_| ledger.events()[first_event..].to_vec())
            }
            Step::Decrypt { .. } => {
                let callbacks = ledger.runtime_mut().fulfil_decryptions();
                for (token, e) in deliver(&mut ledger, height, callbacks) {
                    rejected += 1;
                    println!("{:>6}  rejected decryption {}: {}", height, token, e);
                }
                Ok(ledger.events()[first_event..].to_vec())
            }
        };

        match result {
            Ok(events) => {
                for event in events {
                    match serde_json::to_string(&event) {
                        Ok(json) => println!("{:>6}  {}", height, json),
                        Err(e) => error!("unable to serialize event {}: {}", event, e),
                    }
                }
            }
            Err(e) => {
                rejected += 1;
                println!("{:>6}  rejected step {}: {}", height, i, e);
            }
        }
    }

    println!();
    println!("Votes at height {}:", height);
    for vote_id in 0..ledger.votes_len() as VoteId {
        let status = match ledger.vote_status(vote_id, height) {
            Ok(status) => status,
            Err(_) => continue,
        };
        let ballots = ledger.vote(vote_id).map(|v| v.ballots_cast()).unwrap_or(0);
        match ledger.is_vote_passed(vote_id) {
            Ok(passed) => println!("  {}: {:?}, {} ballots, passed = {}", vote_id, status, ballots, passed),
            Err(_) => println!("  {}: {:?}, {} ballots", vote_id, status, ballots),
        }
    }
    if rejected > 0 {
        println!("{} step(s) rejected", rejected);
    }
    ledger
}

// Play the decryption oracle. Every callback is delivered; failures are returned per token.
fn deliver<V: ProofVerifier>(
    ledger: &mut Suffragium<V, MockRuntime>,
    height: u64,
    callbacks: Vec<(DecryptionToken, Vec<Cleartext>)>,
) -> Vec<(DecryptionToken, ValidationError)> {
    let ctx = Context::new(ledger.config().oracle, height);
    let mut failed = vec![];
    for (token, cleartexts) in callbacks {
        debug!("delivering decryption {}", token);
        if let Err(e) = ledger.on_decryption_callback(&ctx, token, &cleartexts) {
            failed.push((token, e));
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scenario() {
        let scenario: Scenario =
            serde_json::from_str(include_str!("../../demos/scenario.json")).unwrap();
        let config = scenario.config.unwrap();
        let ledger = Suffragium::new(config, MockVerifier::default(), MockRuntime::default())
            .unwrap();
        let ledger = run(ledger, scenario.steps);

        // 4 yes of 5 meets the 80% quorum; the replayed identity and early reveal are rejected
        assert!(ledger.is_vote_passed(0).unwrap());
        assert_eq!(ledger.vote(0).unwrap().ballots_cast(), 5);
        assert_eq!(ledger.min_quorum().version, 1);
        assert!(ledger.runtime().pending_decryptions().is_empty());
    }

    #[test]
    fn unsigned_steps() {
        let step: Step = serde_json::from_str(
            r#"{"step": "decrypt", "height": 7}"#,
        )
        .unwrap();
        assert_eq!(step.height(), 7);

        let step: Step = serde_json::from_str(
            r#"{"step": "reveal", "height": 9, "sender": "0x0101010101010101010101010101010101010101010101010101010101010101", "vote_id": 2}"#,
        )
        .unwrap();
        assert!(matches!(step, Step::Reveal { vote_id: 2, .. }));
    }

    #[test]
    fn failed_callback_does_not_drop_the_rest() {
        let scenario: Scenario =
            serde_json::from_str(include_str!("../../demos/scenario.json")).unwrap();
        let config = scenario.config.unwrap();
        let owner = Context::new(config.owner, 1);
        let mut ledger =
            Suffragium::new(config, MockVerifier::default(), MockRuntime::default()).unwrap();

        let first = ledger.create_vote(&owner, 5, "first".to_string()).unwrap();
        let second = ledger.create_vote(&owner, 5, "second".to_string()).unwrap();
        for vote_id in &[first, second] {
            ledger
                .request_reveal_vote(&Context::new(owner.sender, 5), *vote_id)
                .unwrap();
        }

        // The first answer is malformed
        let mut callbacks = ledger.runtime_mut().fulfil_decryptions();
        assert_eq!(callbacks.len(), 2);
        callbacks[0].1 = vec![Cleartext::Uint(1)];

        let failed = deliver(&mut ledger, 6, callbacks);
        assert_eq!(failed.len(), 1);
        assert!(matches!(
            failed[0].1,
            ValidationError::InvalidCallbackPayload
        ));

        assert!(matches!(
            ledger.is_vote_passed(first),
            Err(ValidationError::NotYetRevealed(_))
        ));
        assert!(!ledger.is_vote_passed(second).unwrap());
    }
}
