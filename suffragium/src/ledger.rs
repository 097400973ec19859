use crate::*;
use indexmap::IndexMap;

/// Caller and block height of one entry-point invocation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Context {
    pub sender: Address,
    pub height: u64,
}

impl Context {
    pub fn new(sender: Address, height: u64) -> Self {
        Context { sender, height }
    }
}

/// The voting ledger.
///
/// Each entry point runs to completion or fails without changing any state. The proof gate,
/// nullifier registry and ballot aggregator run in sequence inside `cast_vote`; `request_reveal_vote`
/// and `on_decryption_callback` are the two halves of the asynchronous reveal.
pub struct Suffragium<V: ProofVerifier, R: CiphertextRuntime> {
    config: Config,
    quorum: QuorumConfig,
    verifier: V,
    runtime: R,
    votes: Vec<Vote>,

    /// Every decryption request ever issued, kept so that replayed callbacks stay no-ops
    requests: IndexMap<DecryptionToken, VoteId>,
    events: Vec<Event>,
}

impl<V: ProofVerifier, R: CiphertextRuntime> Suffragium<V, R> {
    pub fn new(config: Config, verifier: V, runtime: R) -> Result<Self, Error> {
        config.validate()?;
        let quorum = QuorumConfig::new(config.min_quorum);
        Ok(Suffragium {
            config,
            quorum,
            verifier,
            runtime,
            votes: vec![],
            requests: IndexMap::new(),
            events: vec![],
        })
    }

    /// Open a vote accepting ballots until `end_block`
    pub fn create_vote(
        &mut self,
        ctx: &Context,
        end_block: u64,
        description: String,
    ) -> Result<VoteId, ValidationError> {
        if end_block <= ctx.height {
            return Err(ValidationError::InvalidEndMarker {
                end_block,
                height: ctx.height,
            });
        }

        let vote_id = self.votes.len() as VoteId;
        let vote = Vote::new(
            &mut self.runtime,
            &self.config.contract,
            vote_id,
            end_block,
            description,
        )?;
        self.votes.push(vote);

        info!("vote {} created, open until block {}", vote_id, end_block);
        self.events.push(Event::VoteCreated { vote_id });
        Ok(vote_id)
    }

    /// Cast an encrypted ballot.
    ///
    /// `public_values` are the encoded `PublicValues` and `proof` the identity proof over them.
    /// The ballot must be encrypted for this ledger by `ctx.sender`.
    pub fn cast_vote(
        &mut self,
        ctx: &Context,
        vote_id: VoteId,
        ballot: &EncryptedInput,
        public_values: &[u8],
        proof: &[u8],
    ) -> Result<(), ValidationError> {
        let index = self.vote_index(vote_id)?;
        let vote = &self.votes[index];
        if vote.status(ctx.height) != VoteStatus::Open {
            return Err(ValidationError::VoteEnded(vote_id));
        }

        let public_values = PublicValues::from_bytes(public_values)?;
        let claim = IdentityGate::from_config(&self.config).verify_eligibility(
            &self.verifier,
            proof,
            &public_values,
        )?;
        if !claim.eligible {
            return Err(ValidationError::NotEligible);
        }

        vote.nullifiers.ensure_unclaimed(&claim.voter_id)?;
        let update = accumulate(
            &mut self.runtime,
            vote,
            ballot,
            &self.config.contract,
            &ctx.sender,
        )?;

        // Nothing below can fail: commit
        let vote = &mut self.votes[index];
        vote.nullifiers.claim(&claim.voter_id)?;
        update.apply(vote);

        debug!("ballot accepted for vote {}", vote_id);
        self.events.push(Event::VoteCasted { vote_id });
        Ok(())
    }

    /// Request decryption of a closed vote's decision, using the quorum as it stands now
    pub fn request_reveal_vote(
        &mut self,
        ctx: &Context,
        vote_id: VoteId,
    ) -> Result<DecryptionToken, ValidationError> {
        let index = self.vote_index(vote_id)?;
        let token = request_reveal(
            &mut self.runtime,
            &mut self.votes[index],
            ctx.height,
            self.quorum,
            self.config.eligible_voters,
            &self.config.contract,
        )?;
        self.requests.insert(token, vote_id);

        info!(
            "reveal of vote {} requested (token {}, quorum version {})",
            vote_id, token, self.quorum.version
        );
        self.events.push(Event::VoteRevealRequested { vote_id });
        Ok(token)
    }

    /// Accept the oracle's decryption of a reveal request.
    ///
    /// Only the configured oracle may call this, with a token this ledger issued. Replays for a
    /// revealed vote succeed without effect.
    pub fn on_decryption_callback(
        &mut self,
        ctx: &Context,
        token: DecryptionToken,
        cleartexts: &[Cleartext],
    ) -> Result<(), ValidationError> {
        if ctx.sender != self.config.oracle {
            warn!("decryption callback from {} rejected: not the oracle", ctx.sender);
            return Err(ValidationError::UnauthorizedCallback);
        }
        let vote_id = match self.requests.get(&token) {
            Some(vote_id) => *vote_id,
            None => {
                warn!("decryption callback with unknown token {} rejected", token);
                return Err(ValidationError::UnauthorizedCallback);
            }
        };

        let index = self.vote_index(vote_id)?;
        match finalize_reveal(&mut self.votes[index], token, cleartexts)? {
            Some(passed) => {
                info!("vote {} revealed: passed = {}", vote_id, passed);
                self.events.push(Event::VoteRevealed { vote_id, passed });
            }
            None => debug!("duplicate decryption callback for vote {} ignored", vote_id),
        }
        Ok(())
    }

    /// The revealed result of a vote
    pub fn is_vote_passed(&self, vote_id: VoteId) -> Result<bool, ValidationError> {
        let vote = &self.votes[self.vote_index(vote_id)?];
        vote.passed().ok_or(ValidationError::NotYetRevealed(vote_id))
    }

    /// Change the quorum read by future reveals (owner only)
    pub fn set_min_quorum(&mut self, ctx: &Context, min_quorum: u64) -> Result<(), ValidationError> {
        if ctx.sender != self.config.owner {
            return Err(ValidationError::NotOwner);
        }
        self.quorum.update(min_quorum)?;
        info!(
            "min quorum set to {} (version {})",
            min_quorum, self.quorum.version
        );
        Ok(())
    }

    /// Verify and execute a signed transaction at `height`, returning the events it emitted
    pub fn apply(
        &mut self,
        tx: &SignedTransaction,
        height: u64,
    ) -> Result<Vec<Event>, ValidationError> {
        tx.verify_signature()?;
        let ctx = Context::new(tx.sender(), height);
        let first_event = self.events.len();

        debug!("applying {} from {} at height {}", tx.transaction_type(), ctx.sender, height);
        match tx {
            SignedTransaction::CreateVote(signed) => {
                self.create_vote(&ctx, signed.end_block, signed.description.clone())?;
            }
            SignedTransaction::CastVote(signed) => {
                self.cast_vote(
                    &ctx,
                    signed.vote_id,
                    &signed.ballot,
                    &signed.public_values,
                    &signed.proof,
                )?;
            }
            SignedTransaction::RequestReveal(signed) => {
                self.request_reveal_vote(&ctx, signed.vote_id)?;
            }
            SignedTransaction::SetMinQuorum(signed) => {
                self.set_min_quorum(&ctx, signed.min_quorum)?;
            }
            SignedTransaction::DecryptionCallback(signed) => {
                self.on_decryption_callback(&ctx, signed.token, &signed.cleartexts)?;
            }
        }

        Ok(self.events[first_event..].to_vec())
    }

    pub fn vote(&self, vote_id: VoteId) -> Option<&Vote> {
        self.votes.get(vote_id as usize)
    }

    pub fn votes_len(&self) -> usize {
        self.votes.len()
    }

    pub fn vote_status(&self, vote_id: VoteId, height: u64) -> Result<VoteStatus, ValidationError> {
        Ok(self.votes[self.vote_index(vote_id)?].status(height))
    }

    /// Whether a voter identifier has already cast a ballot in a vote
    pub fn has_voted(&self, vote_id: VoteId, voter_id: &[u8; 32]) -> Result<bool, ValidationError> {
        Ok(self.votes[self.vote_index(vote_id)?]
            .nullifiers
            .contains(voter_id))
    }

    pub fn min_quorum(&self) -> QuorumConfig {
        self.quorum
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// All events emitted so far, in order
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    fn vote_index(&self, vote_id: VoteId) -> Result<usize, ValidationError> {
        let index = vote_id as usize;
        if index >= self.votes.len() {
            return Err(ValidationError::VoteNotFound(vote_id));
        }
        Ok(index)
    }
}
