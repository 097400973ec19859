//! Quorum and reveal.
//!
//! Only the final decision is ever decrypted: quorum and majority are evaluated under encryption
//! and combined into a single boolean before it is handed to the decryption oracle.

use crate::*;

/// Compute the encrypted "passed" flag of a vote.
///
/// The vote passes iff the quorum is met and strictly more than half of the ballots are yes.
/// With a known electorate the quorum is participation (`count / eligible_voters`); without one
/// the electorate is the set of ballots cast and the quorum applies to the yes share
/// (`tally / count`). In that mode every ballot cast counts as participating, so a minority
/// result (2 yes, 3 no) fails both clauses at the default 50%: a yes share of 40% misses the
/// quorum and 2 of 5 is no majority.
pub fn encrypted_decision<R: CiphertextRuntime>(
    runtime: &mut R,
    vote: &Vote,
    quorum: &QuorumConfig,
    eligible_voters: Option<u64>,
) -> Result<EncryptedBool, ValidationError> {
    let quorum_met = match eligible_voters {
        Some(eligible) => {
            let participation =
                runtime.mul_constant(&vote.encrypted_count, QUORUM_SCALE as u128)?;
            let required = quorum.min_quorum as u128 * eligible as u128;
            let required = runtime.encrypt_constant(required);
            runtime.ge(&participation, &required)?
        }
        None => {
            let yes_share =
                runtime.mul_constant(&vote.encrypted_tally, QUORUM_SCALE as u128)?;
            let required =
                runtime.mul_constant(&vote.encrypted_count, quorum.min_quorum as u128)?;
            runtime.ge(&yes_share, &required)?
        }
    };

    let doubled = runtime.mul_constant(&vote.encrypted_tally, 2)?;
    let majority = runtime.gt(&doubled, &vote.encrypted_count)?;

    Ok(runtime.and(&quorum_met, &majority)?)
}

/// Start the reveal of a closed vote.
///
/// Reads `quorum` as it stands now, requests decryption of the combined decision and moves the
/// vote to `RevealRequested`. Nothing is written to `vote` on failure.
pub fn request_reveal<R: CiphertextRuntime>(
    runtime: &mut R,
    vote: &mut Vote,
    height: u64,
    quorum: QuorumConfig,
    eligible_voters: Option<u64>,
    contract: &Address,
) -> Result<DecryptionToken, ValidationError> {
    match vote.status(height) {
        VoteStatus::Open => return Err(ValidationError::VoteNotEnded(vote.id)),
        VoteStatus::RevealRequested | VoteStatus::Revealed => {
            return Err(ValidationError::AlreadyRequested(vote.id))
        }
        VoteStatus::Closed => {}
    }

    let decision = encrypted_decision(runtime, vote, &quorum, eligible_voters)?;
    runtime.allow(decision.handle(), contract)?;
    let token = runtime.request_decryption(&[decision.handle()], contract)?;

    vote.reveal = RevealState::Requested { token, quorum };
    Ok(token)
}

/// Apply a decryption result to the vote it was requested for.
///
/// Returns the result if this call published it, `None` if the vote was already revealed by
/// the same token. The caller has already authenticated the oracle.
pub fn finalize_reveal(
    vote: &mut Vote,
    token: DecryptionToken,
    cleartexts: &[Cleartext],
) -> Result<Option<bool>, ValidationError> {
    let state = vote.reveal;
    match state {
        RevealState::Requested {
            token: expected,
            quorum,
        } if expected == token => {
            let passed = match cleartexts {
                [Cleartext::Bool(passed)] => *passed,
                _ => return Err(ValidationError::InvalidCallbackPayload),
            };
            vote.reveal = RevealState::Revealed {
                token,
                quorum,
                passed,
            };
            Ok(Some(passed))
        }
        RevealState::Revealed {
            token: expected, ..
        } if expected == token => Ok(None),
        _ => Err(ValidationError::UnauthorizedCallback),
    }
}
