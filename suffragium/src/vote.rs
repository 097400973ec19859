use crate::*;

/// Votes are numbered from zero in creation order
pub type VoteId = u64;

/// Where a vote is in its lifecycle at a given height
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VoteStatus {
    /// Accepting ballots
    Open,
    /// Window closed, reveal not requested
    Closed,
    /// Decryption in flight
    RevealRequested,
    /// Result published
    Revealed,
}

/// Progress of the reveal, independent of height
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "state")]
#[serde(rename_all = "snake_case")]
pub enum RevealState {
    NotRequested,
    Requested {
        token: DecryptionToken,
        quorum: QuorumConfig,
    },
    Revealed {
        token: DecryptionToken,
        quorum: QuorumConfig,
        passed: bool,
    },
}

/// A vote record. Never deleted.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Vote {
    pub id: VoteId,
    pub description: String,

    /// First height at which ballots are no longer accepted
    pub end_block: u64,

    /// Sum of accepted ballots (yes = 1)
    pub encrypted_tally: EncryptedUint,

    /// Number of accepted ballots
    pub encrypted_count: EncryptedUint,

    pub nullifiers: NullifierSet,
    pub reveal: RevealState,
}

impl Vote {
    /// A vote with tally and count at encrypted zero, granted to `contract`
    pub fn new<R: CiphertextRuntime>(
        runtime: &mut R,
        contract: &Address,
        id: VoteId,
        end_block: u64,
        description: String,
    ) -> Result<Self, ValidationError> {
        let encrypted_tally = runtime.encrypt_constant(0);
        let encrypted_count = runtime.encrypt_constant(0);
        runtime.allow(encrypted_tally.handle(), contract)?;
        runtime.allow(encrypted_count.handle(), contract)?;

        Ok(Vote {
            id,
            description,
            end_block,
            encrypted_tally,
            encrypted_count,
            nullifiers: NullifierSet::default(),
            reveal: RevealState::NotRequested,
        })
    }

    pub fn status(&self, height: u64) -> VoteStatus {
        match self.reveal {
            RevealState::Revealed { .. } => VoteStatus::Revealed,
            RevealState::Requested { .. } => VoteStatus::RevealRequested,
            RevealState::NotRequested if height < self.end_block => VoteStatus::Open,
            RevealState::NotRequested => VoteStatus::Closed,
        }
    }

    /// The revealed result, if any
    pub fn passed(&self) -> Option<bool> {
        match self.reveal {
            RevealState::Revealed { passed, .. } => Some(passed),
            _ => None,
        }
    }

    /// Number of ballots accepted so far. Public: it is the size of the nullifier set.
    pub fn ballots_cast(&self) -> usize {
        self.nullifiers.len()
    }
}

/// Tally and count after adding one ballot, not yet written to the vote
#[derive(Copy, Clone, Debug)]
pub struct TallyUpdate {
    tally: EncryptedUint,
    count: EncryptedUint,
}

impl TallyUpdate {
    pub fn apply(self, vote: &mut Vote) {
        vote.encrypted_tally = self.tally;
        vote.encrypted_count = self.count;
    }
}

/// Verify an encrypted ballot and fold it into the vote's running tally.
///
/// The ballot must have been encrypted for `contract` by `sender`. It is normalised to 0 or 1
/// under encryption, so any nonzero ballot counts as a single yes.
pub fn accumulate<R: CiphertextRuntime>(
    runtime: &mut R,
    vote: &Vote,
    ballot: &EncryptedInput,
    contract: &Address,
    sender: &Address,
) -> Result<TallyUpdate, ValidationError> {
    let ballot = runtime
        .verify_input(ballot, contract, sender)
        .map_err(ValidationError::InvalidBallot)?;

    let yes = runtime.ne_constant(&ballot, 0)?;
    let yes = runtime.bool_to_uint(&yes)?;
    let one = runtime.encrypt_constant(1);

    let tally = runtime.add(&vote.encrypted_tally, &yes)?;
    let count = runtime.add(&vote.encrypted_count, &one)?;
    runtime.allow(tally.handle(), contract)?;
    runtime.allow(count.handle(), contract)?;

    Ok(TallyUpdate { tally, count })
}
