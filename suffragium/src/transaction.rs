use crate::*;
use ed25519_dalek::ExpandedSecretKey;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use ed25519_dalek::Signature;
use ed25519_dalek::Verifier;
use num_enum::TryFromPrimitive;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::convert::AsRef;
use std::ops::Deref;

/// An unsigned transaction
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum Transaction {
    CreateVote(CreateVoteTransaction),
    CastVote(CastVoteTransaction),
    RequestReveal(RequestRevealTransaction),
    SetMinQuorum(SetMinQuorumTransaction),
    DecryptionCallback(DecryptionCallbackTransaction),
}

impl Transaction {
    /// Get the transaction type
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Transaction::CreateVote(_) => TransactionType::CreateVote,
            Transaction::CastVote(_) => TransactionType::CastVote,
            Transaction::RequestReveal(_) => TransactionType::RequestReveal,
            Transaction::SetMinQuorum(_) => TransactionType::SetMinQuorum,
            Transaction::DecryptionCallback(_) => TransactionType::DecryptionCallback,
        }
    }

    /// Unpack from JSON or CBOR bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        decode(bytes)
    }
}

/// A signed transaction
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(tag = "type")]
#[serde(rename_all = "snake_case")]
pub enum SignedTransaction {
    CreateVote(Signed<CreateVoteTransaction>),
    CastVote(Signed<CastVoteTransaction>),
    RequestReveal(Signed<RequestRevealTransaction>),
    SetMinQuorum(Signed<SetMinQuorumTransaction>),
    DecryptionCallback(Signed<DecryptionCallbackTransaction>),
}

impl SignedTransaction {
    /// Get the transaction type
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            SignedTransaction::CreateVote(_) => TransactionType::CreateVote,
            SignedTransaction::CastVote(_) => TransactionType::CastVote,
            SignedTransaction::RequestReveal(_) => TransactionType::RequestReveal,
            SignedTransaction::SetMinQuorum(_) => TransactionType::SetMinQuorum,
            SignedTransaction::DecryptionCallback(_) => TransactionType::DecryptionCallback,
        }
    }

    /// The account that signed the transaction
    pub fn sender(&self) -> Address {
        match self {
            SignedTransaction::CreateVote(signed) => signed.sender(),
            SignedTransaction::CastVote(signed) => signed.sender(),
            SignedTransaction::RequestReveal(signed) => signed.sender(),
            SignedTransaction::SetMinQuorum(signed) => signed.sender(),
            SignedTransaction::DecryptionCallback(signed) => signed.sender(),
        }
    }

    /// Pack into bytes
    pub fn as_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Unpack from JSON or CBOR bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        decode(bytes)
    }

    pub fn verify_signature(&self) -> Result<(), ValidationError> {
        match self {
            SignedTransaction::CreateVote(signed) => signed.verify_signature(),
            SignedTransaction::CastVote(signed) => signed.verify_signature(),
            SignedTransaction::RequestReveal(signed) => signed.verify_signature(),
            SignedTransaction::SetMinQuorum(signed) => signed.verify_signature(),
            SignedTransaction::DecryptionCallback(signed) => signed.verify_signature(),
        }
    }
}

// Transactions are maps: JSON starts with `{`, which is never the first byte of a CBOR map
fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, Error> {
    match bytes.iter().find(|b| !b.is_ascii_whitespace()) {
        Some(b'{') => Ok(serde_json::from_slice(bytes)?),
        Some(_) => Ok(serde_cbor::from_slice(bytes)?),
        None => Err(Error::DeserializationUnknownFormat),
    }
}

/// This trait should be considered sealed and should not be implemented outside this crate
#[doc(hidden)]
pub trait Signable: Serialize {
    /// Key of the account submitting the transaction
    fn public(&self) -> PublicKey;

    fn as_bytes(&self) -> Result<Vec<u8>, serde_cbor::Error> {
        serde_cbor::to_vec(&self)
    }
}

/// A generic signed transaction
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Signed<T: Signable + Serialize> {
    pub tx: T,

    #[serde(with = "ed_signature_hex")]
    pub sig: Signature,
}

impl<T: Signable + Serialize> Signed<T> {
    /// Sign a transaction, producing a Signed<T>
    pub fn sign(secret: &SecretKey, transaction: T) -> Result<Self, Error> {
        let public_key = PublicKey::from(secret);
        if public_key != transaction.public() {
            return Err(Error::MismatchedPublicKeys);
        }

        let serialized = transaction.as_bytes()?;

        let expanded: ExpandedSecretKey = secret.into();
        let signature = expanded.sign(&serialized, &public_key);

        Ok(Signed {
            tx: transaction,
            sig: signature,
        })
    }

    /// Verify the signature on a signed transaction
    pub fn verify_signature(&self) -> Result<(), ValidationError> {
        let serialized = self.tx.as_bytes()?;
        Ok(self.tx.public().verify(&serialized, &self.sig)?)
    }

    /// Get the inner unsigned transaction
    pub fn inner(&self) -> &T {
        &self.tx
    }

    pub fn sender(&self) -> Address {
        Address::from(self.tx.public())
    }
}

impl<T: Signable + Serialize> AsRef<T> for Signed<T> {
    fn as_ref(&self) -> &T {
        &self.tx
    }
}

impl<T: Signable + Serialize> Deref for Signed<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.tx
    }
}

/// A transaction type
#[derive(Serialize, Deserialize, TryFromPrimitive, Copy, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum TransactionType {
    CreateVote = 1,
    CastVote = 2,
    RequestReveal = 3,
    SetMinQuorum = 4,
    DecryptionCallback = 5,
}

impl TransactionType {
    pub fn name(&self) -> &'static str {
        match self {
            TransactionType::CreateVote => "create_vote",
            TransactionType::CastVote => "cast_vote",
            TransactionType::RequestReveal => "request_reveal",
            TransactionType::SetMinQuorum => "set_min_quorum",
            TransactionType::DecryptionCallback => "decryption_callback",
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Open a new vote closing at `end_block`
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CreateVoteTransaction {
    #[serde(with = "ed_public_key_hex")]
    pub sender: PublicKey,
    pub end_block: u64,
    pub description: String,
}

/// Cast an encrypted ballot, gated by an identity proof
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct CastVoteTransaction {
    #[serde(with = "ed_public_key_hex")]
    pub sender: PublicKey,
    pub vote_id: VoteId,
    pub ballot: EncryptedInput,

    /// Encoded `PublicValues`
    #[serde(with = "hex_bytes")]
    pub public_values: Vec<u8>,

    /// Identity proof over `public_values`
    #[serde(with = "hex_bytes")]
    pub proof: Vec<u8>,
}

/// Ask for the result of a closed vote to be decrypted
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct RequestRevealTransaction {
    #[serde(with = "ed_public_key_hex")]
    pub sender: PublicKey,
    pub vote_id: VoteId,
}

/// Change the global quorum (owner only)
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct SetMinQuorumTransaction {
    #[serde(with = "ed_public_key_hex")]
    pub sender: PublicKey,
    pub min_quorum: u64,
}

/// Cleartexts delivered by the decryption oracle
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DecryptionCallbackTransaction {
    #[serde(with = "ed_public_key_hex")]
    pub sender: PublicKey,
    pub token: DecryptionToken,
    pub cleartexts: Vec<Cleartext>,
}

macro_rules! signable {
    ($($variant:ident => $tx:ty),* $(,)?) => {
        $(
            impl Signable for $tx {
                fn public(&self) -> PublicKey {
                    self.sender
                }
            }

            impl From<Signed<$tx>> for SignedTransaction {
                fn from(tx: Signed<$tx>) -> Self {
                    SignedTransaction::$variant(tx)
                }
            }

            impl From<$tx> for Transaction {
                fn from(tx: $tx) -> Self {
                    Transaction::$variant(tx)
                }
            }
        )*
    };
}

signable! {
    CreateVote => CreateVoteTransaction,
    CastVote => CastVoteTransaction,
    RequestReveal => RequestRevealTransaction,
    SetMinQuorum => SetMinQuorumTransaction,
    DecryptionCallback => DecryptionCallbackTransaction,
}

impl Transaction {
    /// Sign with `secret`, which must match the transaction's sender
    pub fn sign(self, secret: &SecretKey) -> Result<SignedTransaction, Error> {
        Ok(match self {
            Transaction::CreateVote(tx) => Signed::sign(secret, tx)?.into(),
            Transaction::CastVote(tx) => Signed::sign(secret, tx)?.into(),
            Transaction::RequestReveal(tx) => Signed::sign(secret, tx)?.into(),
            Transaction::SetMinQuorum(tx) => Signed::sign(secret, tx)?.into(),
            Transaction::DecryptionCallback(tx) => Signed::sign(secret, tx)?.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::TryFrom;

    #[test]
    fn transaction_types() {
        assert!(TransactionType::CreateVote as u8 == 1);
        assert!(TransactionType::DecryptionCallback as u8 == 5);
        assert_eq!(
            TransactionType::try_from(3u8).unwrap(),
            TransactionType::RequestReveal
        );
        assert!(TransactionType::try_from(0u8).is_err());
        assert_eq!(format!("{}", TransactionType::CastVote), "cast_vote");
    }

    #[test]
    fn sign_and_verify() {
        let (secret, public) = generate_keypair();
        let (bad_secret, _bad_public) = generate_keypair();

        let tx = RequestRevealTransaction {
            sender: public,
            vote_id: 3,
        };

        // Signing with wrong key should fail
        assert!(matches!(
            Signed::sign(&bad_secret, tx.clone()),
            Err(Error::MismatchedPublicKeys)
        ));

        let signed = Signed::sign(&secret, tx).unwrap();
        signed.verify_signature().unwrap();
        assert_eq!(signed.sender(), Address::from(&public));
        assert_eq!(signed.vote_id, 3);

        // Tampering breaks the signature
        let mut tampered = signed.clone();
        tampered.tx.vote_id = 4;
        assert!(matches!(
            tampered.verify_signature(),
            Err(ValidationError::SignatureError(_))
        ));
    }

    #[test]
    fn json_and_cbor() {
        let (secret, public) = generate_keypair();
        let tx: Transaction = CastVoteTransaction {
            sender: public,
            vote_id: 0,
            ballot: EncryptedInput {
                handle: [5; 32],
                proof: vec![1, 2, 3],
            },
            public_values: vec![0; PUBLIC_VALUES_LEN],
            proof: vec![],
        }
        .into();
        assert_eq!(tx.transaction_type(), TransactionType::CastVote);

        let unsigned_json = serde_json::to_vec(&tx).unwrap();
        let unsigned = Transaction::from_bytes(&unsigned_json).unwrap();
        assert_eq!(unsigned.transaction_type(), TransactionType::CastVote);

        let signed = tx.sign(&secret).unwrap();
        assert_eq!(signed.sender(), Address::from(&public));

        let json = serde_json::to_string(&signed).unwrap();
        assert!(json.contains("\"type\":\"cast_vote\""));
        let from_json = SignedTransaction::from_bytes(json.as_bytes()).unwrap();
        from_json.verify_signature().unwrap();

        let cbor = signed.as_bytes().unwrap();
        let from_cbor = SignedTransaction::from_bytes(&cbor).unwrap();
        from_cbor.verify_signature().unwrap();
        assert_eq!(from_cbor.transaction_type(), TransactionType::CastVote);
    }

    #[test]
    fn cbor_without_zero_bytes() {
        let (secret, public) = generate_keypair();
        let tx: Transaction = RequestRevealTransaction {
            sender: public,
            vote_id: 3,
        }
        .into();

        let unsigned = serde_cbor::to_vec(&tx).unwrap();
        assert!(!unsigned.contains(&0));
        let unsigned = Transaction::from_bytes(&unsigned).unwrap();
        assert_eq!(unsigned.transaction_type(), TransactionType::RequestReveal);

        let signed = tx.sign(&secret).unwrap();
        let from_cbor = SignedTransaction::from_bytes(&signed.as_bytes().unwrap()).unwrap();
        from_cbor.verify_signature().unwrap();
        match from_cbor {
            SignedTransaction::RequestReveal(signed) => assert_eq!(signed.vote_id, 3),
            other => panic!("unexpected transaction {}", other.transaction_type()),
        }

        // Pretty-printed JSON is still JSON
        let pretty = format!("\n  {}", serde_json::to_string_pretty(&signed).unwrap());
        SignedTransaction::from_bytes(pretty.as_bytes())
            .unwrap()
            .verify_signature()
            .unwrap();

        assert!(matches!(
            SignedTransaction::from_bytes(b""),
            Err(Error::DeserializationUnknownFormat)
        ));
    }
}
