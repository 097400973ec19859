use crate::*;
use indexmap::IndexSet;

/// Voter identifiers that have cast a ballot in one vote.
///
/// Grows monotonically; an identifier can be claimed once.
#[derive(Serialize, Deserialize, Default, Clone, Debug)]
pub struct NullifierSet {
    claimed: IndexSet<Nullifier>,
}

/// A voter identifier as produced by the identity circuit
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Nullifier(#[serde(with = "hex_bytes32")] pub [u8; 32]);

impl NullifierSet {
    pub fn contains(&self, voter_id: &[u8; 32]) -> bool {
        self.claimed.contains(&Nullifier(*voter_id))
    }

    /// Fail with `AlreadyVoted` if the identifier has been claimed
    pub fn ensure_unclaimed(&self, voter_id: &[u8; 32]) -> Result<(), ValidationError> {
        if self.contains(voter_id) {
            return Err(ValidationError::AlreadyVoted);
        }
        Ok(())
    }

    /// Check and insert in one step
    pub fn claim(&mut self, voter_id: &[u8; 32]) -> Result<(), ValidationError> {
        if !self.claimed.insert(Nullifier(*voter_id)) {
            return Err(ValidationError::AlreadyVoted);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_once() {
        let mut set = NullifierSet::default();
        assert!(set.is_empty());

        set.ensure_unclaimed(&[1; 32]).unwrap();
        set.claim(&[1; 32]).unwrap();
        assert!(set.contains(&[1; 32]));

        assert!(matches!(
            set.claim(&[1; 32]),
            Err(ValidationError::AlreadyVoted)
        ));
        assert!(matches!(
            set.ensure_unclaimed(&[1; 32]),
            Err(ValidationError::AlreadyVoted)
        ));
        assert_eq!(set.len(), 1);

        set.claim(&[2; 32]).unwrap();
        assert_eq!(set.len(), 2);
    }
}
