use crate::*;

/// Fixed-point scale of quorum fractions: `QUORUM_SCALE` is 100%
pub const QUORUM_SCALE: u64 = 1_000_000_000_000_000_000;

/// Quorum applied when none is configured (50%)
pub const DEFAULT_MIN_QUORUM: u64 = QUORUM_SCALE / 2;

/// Construction-time constants of a voting ledger
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Address of this ledger instance. Ballot ciphertexts must be scoped to it.
    pub contract: Address,

    /// Account allowed to change the quorum
    pub owner: Address,

    /// Account of the decryption oracle allowed to deliver callbacks
    pub oracle: Address,

    /// Verification key of the identity circuit
    #[serde(with = "hex_bytes32")]
    pub verification_key: [u8; 32],

    /// Hash of the DKIM public key the proven email must be signed under
    #[serde(with = "hex_bytes32")]
    pub email_public_key_hash: [u8; 32],

    /// Hash of the sender domain the proven email must come from
    #[serde(with = "hex_bytes32")]
    pub from_domain_hash: [u8; 32],

    /// Initial quorum fraction, scaled by `QUORUM_SCALE`
    #[serde(default = "default_min_quorum")]
    pub min_quorum: u64,

    /// Size of the eligible electorate, if known
    #[serde(default)]
    pub eligible_voters: Option<u64>,
}

fn default_min_quorum() -> u64 {
    DEFAULT_MIN_QUORUM
}

impl Config {
    pub fn new(
        contract: Address,
        owner: Address,
        oracle: Address,
        verification_key: [u8; 32],
        email_public_key_hash: [u8; 32],
        from_domain_hash: [u8; 32],
    ) -> Self {
        Config {
            contract,
            owner,
            oracle,
            verification_key,
            email_public_key_hash,
            from_domain_hash,
            min_quorum: DEFAULT_MIN_QUORUM,
            eligible_voters: None,
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_quorum(self.min_quorum)
    }
}

pub(crate) fn validate_quorum(min_quorum: u64) -> Result<(), ValidationError> {
    if min_quorum > QUORUM_SCALE {
        return Err(ValidationError::InvalidQuorum(min_quorum));
    }
    Ok(())
}

/// The owner-mutable quorum, versioned so that a reveal can record which setting it read
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
pub struct QuorumConfig {
    pub min_quorum: u64,
    pub version: u64,
}

impl QuorumConfig {
    pub fn new(min_quorum: u64) -> Self {
        QuorumConfig {
            min_quorum,
            version: 0,
        }
    }

    /// Replace the quorum, bumping the version
    pub fn update(&mut self, min_quorum: u64) -> Result<(), ValidationError> {
        validate_quorum(min_quorum)?;
        self.min_quorum = min_quorum;
        self.version += 1;
        Ok(())
    }
}
