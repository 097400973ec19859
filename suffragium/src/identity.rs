//! Identity proof gate.
//!
//! A voter proves, without revealing the address, that they received an email from the configured
//! domain signed under the configured DKIM key. The proof's public values carry a nullifier
//! (`voter_id`) that is stable per address, which is what prevents double voting.

use crate::*;
use ed25519_dalek::ExpandedSecretKey;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use ed25519_dalek::Signature;
use ed25519_dalek::Verifier;
use std::convert::TryFrom;

/// A succinct proof verification engine
pub trait ProofVerifier {
    /// Check `proof` against `verification_key` and the hash of the public values.
    fn verify(&self, verification_key: &[u8; 32], proof: &[u8], public_values_hash: &[u8; 32])
        -> bool;
}

/// What an accepted proof attests
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct EligibilityClaim {
    pub voter_id: [u8; 32],
    pub eligible: bool,
}

/// Stateless check of a proof and its public values against the configured constants
pub struct IdentityGate<'a> {
    pub verification_key: &'a [u8; 32],
    pub email_public_key_hash: &'a [u8; 32],
    pub from_domain_hash: &'a [u8; 32],
}

impl<'a> IdentityGate<'a> {
    pub fn from_config(config: &'a Config) -> Self {
        IdentityGate {
            verification_key: &config.verification_key,
            email_public_key_hash: &config.email_public_key_hash,
            from_domain_hash: &config.from_domain_hash,
        }
    }

    /// Validate the public values, then the proof.
    ///
    /// Mismatched constants are rejected before the verification engine is called.
    pub fn verify_eligibility<V: ProofVerifier>(
        &self,
        verifier: &V,
        proof: &[u8],
        public_values: &PublicValues,
    ) -> Result<EligibilityClaim, ValidationError> {
        if public_values.from_domain_hash != *self.from_domain_hash
            || public_values.email_public_key_hash != *self.email_public_key_hash
        {
            return Err(ValidationError::InvalidPublicValues);
        }

        if !verifier.verify(self.verification_key, proof, &public_values.hash()) {
            return Err(ValidationError::InvalidProof);
        }

        Ok(EligibilityClaim {
            voter_id: public_values.voter_id,
            eligible: public_values.eligible,
        })
    }
}

/// Verification engine backed by a trusted email attestation service.
///
/// The verification key is the service's ed25519 public key and a proof is its signature over
/// the public values hash.
#[derive(Default, Clone, Debug)]
pub struct AttestationVerifier;

impl AttestationVerifier {
    /// Produce an attestation for `public_values` (run by the attestation service)
    pub fn attest(secret: &SecretKey, public_values: &PublicValues) -> Vec<u8> {
        let public = PublicKey::from(secret);
        let expanded: ExpandedSecretKey = secret.into();
        let signature = expanded.sign(&public_values.hash(), &public);
        signature.to_bytes().to_vec()
    }
}

impl ProofVerifier for AttestationVerifier {
    fn verify(&self, verification_key: &[u8; 32], proof: &[u8], public_values_hash: &[u8; 32])
        -> bool {
        let public = match PublicKey::from_bytes(verification_key) {
            Ok(public) => public,
            Err(_) => return false,
        };
        let signature = match Signature::try_from(proof) {
            Ok(signature) => signature,
            Err(_) => return false,
        };
        public.verify(public_values_hash, &signature).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockVerifier;

    fn config_with_key(verification_key: [u8; 32]) -> Config {
        Config::new(
            Address([1; 32]),
            Address([2; 32]),
            Address([3; 32]),
            verification_key,
            [0xee; 32],
            [0xdd; 32],
        )
    }

    fn public_values() -> PublicValues {
        PublicValues {
            from_domain_hash: [0xdd; 32],
            email_public_key_hash: [0xee; 32],
            identity_public_key_hash: [0; 32],
            voter_id: [7; 32],
            eligible: true,
        }
    }

    #[test]
    fn mismatched_constants_skip_the_engine() {
        let config = config_with_key([0; 32]);
        let gate = IdentityGate::from_config(&config);
        let verifier = MockVerifier::default();

        let mut values = public_values();
        values.from_domain_hash = [0xaa; 32];
        assert!(matches!(
            gate.verify_eligibility(&verifier, b"", &values),
            Err(ValidationError::InvalidPublicValues)
        ));

        let mut values = public_values();
        values.email_public_key_hash = [0xaa; 32];
        assert!(matches!(
            gate.verify_eligibility(&verifier, b"", &values),
            Err(ValidationError::InvalidPublicValues)
        ));

        assert_eq!(verifier.calls(), 0);
    }

    #[test]
    fn engine_rejection_is_invalid_proof() {
        let config = config_with_key([0; 32]);
        let gate = IdentityGate::from_config(&config);
        let verifier = MockVerifier::rejecting();

        assert!(matches!(
            gate.verify_eligibility(&verifier, b"proof", &public_values()),
            Err(ValidationError::InvalidProof)
        ));
        assert_eq!(verifier.calls(), 1);
    }

    #[test]
    fn attested_proof_is_accepted() {
        let (attestor_secret, attestor_public) = generate_keypair();
        let config = config_with_key(attestor_public.to_bytes());
        let gate = IdentityGate::from_config(&config);

        let values = public_values();
        let proof = AttestationVerifier::attest(&attestor_secret, &values);
        let claim = gate
            .verify_eligibility(&AttestationVerifier, &proof, &values)
            .unwrap();
        assert_eq!(claim.voter_id, [7; 32]);
        assert!(claim.eligible);

        // The attestation does not carry over to other public values
        let mut other = values.clone();
        other.voter_id = [8; 32];
        assert!(matches!(
            gate.verify_eligibility(&AttestationVerifier, &proof, &other),
            Err(ValidationError::InvalidProof)
        ));

        // Nor to another attestor
        let (rogue_secret, _) = generate_keypair();
        let forged = AttestationVerifier::attest(&rogue_secret, &values);
        assert!(gate
            .verify_eligibility(&AttestationVerifier, &forged, &values)
            .is_err());
        assert!(!AttestationVerifier.verify(&config.verification_key, b"short", &values.hash()));
    }
}
