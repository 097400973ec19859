//! Interface to the homomorphic ciphertext runtime.
//!
//! The ledger never sees plaintext: it holds opaque handles and asks the runtime to compose
//! them. Access to a handle is granted per account, and only granted handles may be decrypted.

use crate::*;
use thiserror::Error;

/// Opaque reference to a ciphertext held by the runtime
pub type Handle = [u8; 32];

/// An encrypted unsigned integer
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncryptedUint(#[serde(with = "hex_bytes32")] Handle);

/// An encrypted boolean
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct EncryptedBool(#[serde(with = "hex_bytes32")] Handle);

impl EncryptedUint {
    /// Wrap a handle issued by a runtime
    pub fn from_handle(handle: Handle) -> Self {
        EncryptedUint(handle)
    }

    pub fn handle(&self) -> Handle {
        self.0
    }
}

impl EncryptedBool {
    /// Wrap a handle issued by a runtime
    pub fn from_handle(handle: Handle) -> Self {
        EncryptedBool(handle)
    }

    pub fn handle(&self) -> Handle {
        self.0
    }
}

/// A client-encrypted value together with its proof of well-formedness.
///
/// The proof binds the ciphertext to one contract and one submitting account.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EncryptedInput {
    #[serde(with = "hex_bytes32")]
    pub handle: Handle,

    #[serde(with = "hex_bytes")]
    pub proof: Vec<u8>,
}

/// Correlates a decryption request with its callback
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecryptionToken(pub u64);

impl std::fmt::Display for DecryptionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A decrypted value delivered by the oracle
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Cleartext {
    Bool(bool),
    Uint(u64),
}

/// Runtime failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("unknown ciphertext handle {}", hex::encode(.0))]
    UnknownHandle(Handle),

    #[error("input proof does not match ciphertext")]
    InvalidInputProof,

    #[error("input was encrypted for another contract or sender")]
    InputScopeMismatch,

    #[error("account {account} is not allowed to use handle {}", hex::encode(.handle))]
    NotAllowed { handle: Handle, account: Address },

    #[error("ciphertext type mismatch")]
    TypeMismatch,

    #[error("arithmetic overflow")]
    Overflow,
}

/// Homomorphic operations over opaque handles.
///
/// Results of an operation are owned by the runtime; callers must `allow` them before they can
/// be used in a later transaction or decrypted.
pub trait CiphertextRuntime {
    /// Check an input's proof and scope, returning the ciphertext it carries
    fn verify_input(
        &mut self,
        input: &EncryptedInput,
        contract: &Address,
        sender: &Address,
    ) -> Result<EncryptedUint, RuntimeError>;

    /// Trivially encrypt a public constant
    fn encrypt_constant(&mut self, value: u128) -> EncryptedUint;

    fn add(&mut self, lhs: &EncryptedUint, rhs: &EncryptedUint)
        -> Result<EncryptedUint, RuntimeError>;

    fn mul_constant(&mut self, lhs: &EncryptedUint, rhs: u128)
        -> Result<EncryptedUint, RuntimeError>;

    /// `lhs >= rhs`
    fn ge(&mut self, lhs: &EncryptedUint, rhs: &EncryptedUint)
        -> Result<EncryptedBool, RuntimeError>;

    /// `lhs > rhs`
    fn gt(&mut self, lhs: &EncryptedUint, rhs: &EncryptedUint)
        -> Result<EncryptedBool, RuntimeError>;

    /// `lhs != rhs`
    fn ne_constant(&mut self, lhs: &EncryptedUint, rhs: u128)
        -> Result<EncryptedBool, RuntimeError>;

    fn and(&mut self, lhs: &EncryptedBool, rhs: &EncryptedBool)
        -> Result<EncryptedBool, RuntimeError>;

    /// Cast a boolean to 0 or 1
    fn bool_to_uint(&mut self, value: &EncryptedBool) -> Result<EncryptedUint, RuntimeError>;

    /// Grant `account` persistent access to `handle`
    fn allow(&mut self, handle: Handle, account: &Address) -> Result<(), RuntimeError>;

    fn is_allowed(&self, handle: Handle, account: &Address) -> bool;

    /// Queue the decryption of `handles`. The cleartexts arrive later through the oracle's
    /// callback, keyed by the returned token.
    fn request_decryption(
        &mut self,
        handles: &[Handle],
        requester: &Address,
    ) -> Result<DecryptionToken, RuntimeError>;
}
