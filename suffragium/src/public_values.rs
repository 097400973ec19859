use crate::*;
use digest::Digest;
use sha2::Sha256;
use std::convert::TryInto;

/// Length of the encoded public values: five 32-byte words
pub const PUBLIC_VALUES_LEN: usize = 5 * 32;

/// Values committed to by the identity circuit.
///
/// Encoded as five 32-byte words in field order, the boolean right-aligned in the last word.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct PublicValues {
    #[serde(with = "hex_bytes32")]
    pub from_domain_hash: [u8; 32],

    #[serde(with = "hex_bytes32")]
    pub email_public_key_hash: [u8; 32],

    #[serde(with = "hex_bytes32")]
    pub identity_public_key_hash: [u8; 32],

    /// Nullifier derived inside the circuit, unique per email address
    #[serde(with = "hex_bytes32")]
    pub voter_id: [u8; 32],

    pub eligible: bool,
}

impl PublicValues {
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PUBLIC_VALUES_LEN);
        bytes.extend_from_slice(&self.from_domain_hash);
        bytes.extend_from_slice(&self.email_public_key_hash);
        bytes.extend_from_slice(&self.identity_public_key_hash);
        bytes.extend_from_slice(&self.voter_id);
        let mut flag = [0u8; 32];
        flag[31] = self.eligible as u8;
        bytes.extend_from_slice(&flag);
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ValidationError> {
        if bytes.len() != PUBLIC_VALUES_LEN {
            return Err(ValidationError::InvalidPublicValues);
        }
        let word = |i: usize| -> [u8; 32] {
            // In bounds: length checked above
            bytes[i * 32..(i + 1) * 32].try_into().unwrap_or([0; 32])
        };

        let flag = word(4);
        if flag[..31].iter().any(|b| *b != 0) || flag[31] > 1 {
            return Err(ValidationError::InvalidPublicValues);
        }

        Ok(PublicValues {
            from_domain_hash: word(0),
            email_public_key_hash: word(1),
            identity_public_key_hash: word(2),
            voter_id: word(3),
            eligible: flag[31] == 1,
        })
    }

    /// SHA-256 over the encoded words, as handed to the verification engine
    pub fn hash(&self) -> [u8; 32] {
        let digest = Sha256::digest(&self.to_bytes());
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        out
    }
}
