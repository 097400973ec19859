//! In-memory stand-ins for the external collaborators: a verification engine that accepts (or
//! rejects) every proof, and a ciphertext runtime that keeps plaintexts behind opaque handles
//! and queues decryption requests until an oracle fulfils them.

use crate::*;
use digest::Digest;
use indexmap::IndexMap;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use sha2::Sha256;
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::convert::TryFrom;

/// Verification engine that ignores the proof
#[derive(Debug)]
pub struct MockVerifier {
    accept: bool,
    calls: Cell<usize>,
}

impl Default for MockVerifier {
    fn default() -> Self {
        MockVerifier {
            accept: true,
            calls: Cell::new(0),
        }
    }
}

impl MockVerifier {
    /// A verifier that rejects every proof
    pub fn rejecting() -> Self {
        MockVerifier {
            accept: false,
            calls: Cell::new(0),
        }
    }

    /// Number of times the engine was asked to verify
    pub fn calls(&self) -> usize {
        self.calls.get()
    }
}

impl ProofVerifier for MockVerifier {
    fn verify(&self, _verification_key: &[u8; 32], _proof: &[u8], _public_values_hash: &[u8; 32])
        -> bool {
        self.calls.set(self.calls.get() + 1);
        self.accept
    }
}

#[derive(Copy, Clone, Debug)]
enum Plain {
    Uint(u128),
    Bool(bool),
}

#[derive(Copy, Clone, Debug)]
struct InputScope {
    contract: Address,
    sender: Address,
}

/// Ciphertext runtime that holds plaintexts in memory
pub struct MockRuntime {
    rng: ChaCha20Rng,
    values: HashMap<Handle, Plain>,
    inputs: HashMap<Handle, InputScope>,
    acl: HashSet<(Handle, Address)>,
    next_token: u64,
    pending: IndexMap<DecryptionToken, Vec<Handle>>,
}

impl Default for MockRuntime {
    fn default() -> Self {
        MockRuntime::with_seed(0)
    }
}

impl MockRuntime {
    /// Handles are drawn from a seeded generator so runs are reproducible
    pub fn with_seed(seed: u64) -> Self {
        MockRuntime {
            rng: ChaCha20Rng::seed_from_u64(seed),
            values: HashMap::new(),
            inputs: HashMap::new(),
            acl: HashSet::new(),
            next_token: 0,
            pending: IndexMap::new(),
        }
    }

    /// Client-side encryption of a ballot for `contract`, submitted by `sender`
    pub fn encrypt_input(&mut self, value: u64, contract: &Address, sender: &Address) -> EncryptedInput {
        let handle = self.store(Plain::Uint(value as u128));
        self.inputs.insert(
            handle,
            InputScope {
                contract: *contract,
                sender: *sender,
            },
        );
        EncryptedInput {
            handle,
            proof: input_proof(&handle, contract, sender),
        }
    }

    /// Deliver every queued decryption, as the oracle would
    pub fn fulfil_decryptions(&mut self) -> Vec<(DecryptionToken, Vec<Cleartext>)> {
        let pending: Vec<(DecryptionToken, Vec<Handle>)> = self.pending.drain(..).collect();
        pending
            .into_iter()
            .map(|(token, handles)| {
                let cleartexts = handles
                    .iter()
                    .filter_map(|handle| self.peek(*handle))
                    .collect();
                (token, cleartexts)
            })
            .collect()
    }

    /// Tokens of decryption requests not yet fulfilled
    pub fn pending_decryptions(&self) -> Vec<DecryptionToken> {
        self.pending.keys().copied().collect()
    }

    /// Read a plaintext directly. Only meaningful in tests and simulations.
    pub fn peek(&self, handle: Handle) -> Option<Cleartext> {
        self.values.get(&handle).and_then(|plain| match plain {
            Plain::Uint(v) => u64::try_from(*v).ok().map(Cleartext::Uint),
            Plain::Bool(b) => Some(Cleartext::Bool(*b)),
        })
    }

    fn store(&mut self, plain: Plain) -> Handle {
        let handle: Handle = self.rng.gen();
        self.values.insert(handle, plain);
        handle
    }

    fn uint(&self, value: &EncryptedUint) -> Result<u128, RuntimeError> {
        match self.values.get(&value.handle()) {
            Some(Plain::Uint(v)) => Ok(*v),
            Some(Plain::Bool(_)) => Err(RuntimeError::TypeMismatch),
            None => Err(RuntimeError::UnknownHandle(value.handle())),
        }
    }

    fn boolean(&self, value: &EncryptedBool) -> Result<bool, RuntimeError> {
        match self.values.get(&value.handle()) {
            Some(Plain::Bool(b)) => Ok(*b),
            Some(Plain::Uint(_)) => Err(RuntimeError::TypeMismatch),
            None => Err(RuntimeError::UnknownHandle(value.handle())),
        }
    }

    fn new_uint(&mut self, v: u128) -> EncryptedUint {
        EncryptedUint::from_handle(self.store(Plain::Uint(v)))
    }

    fn new_bool(&mut self, b: bool) -> EncryptedBool {
        EncryptedBool::from_handle(self.store(Plain::Bool(b)))
    }
}

fn input_proof(handle: &Handle, contract: &Address, sender: &Address) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(handle);
    hasher.update(contract.as_bytes());
    hasher.update(sender.as_bytes());
    hasher.finalize().to_vec()
}

impl CiphertextRuntime for MockRuntime {
    fn verify_input(
        &mut self,
        input: &EncryptedInput,
        contract: &Address,
        sender: &Address,
    ) -> Result<EncryptedUint, RuntimeError> {
        let scope = self
            .inputs
            .get(&input.handle)
            .ok_or(RuntimeError::UnknownHandle(input.handle))?;
        if scope.contract != *contract || scope.sender != *sender {
            return Err(RuntimeError::InputScopeMismatch);
        }
        if input.proof != input_proof(&input.handle, contract, sender) {
            return Err(RuntimeError::InvalidInputProof);
        }
        Ok(EncryptedUint::from_handle(input.handle))
    }

    fn encrypt_constant(&mut self, value: u128) -> EncryptedUint {
        self.new_uint(value)
    }

    fn add(&mut self, lhs: &EncryptedUint, rhs: &EncryptedUint)
        -> Result<EncryptedUint, RuntimeError> {
        let sum = self
            .uint(lhs)?
            .checked_add(self.uint(rhs)?)
            .ok_or(RuntimeError::Overflow)?;
        Ok(self.new_uint(sum))
    }

    fn mul_constant(&mut self, lhs: &EncryptedUint, rhs: u128)
        -> Result<EncryptedUint, RuntimeError> {
        let product = self.uint(lhs)?.checked_mul(rhs).ok_or(RuntimeError::Overflow)?;
        Ok(self.new_uint(product))
    }

    fn ge(&mut self, lhs: &EncryptedUint, rhs: &EncryptedUint)
        -> Result<EncryptedBool, RuntimeError> {
        let result = self.uint(lhs)? >= self.uint(rhs)?;
        Ok(self.new_bool(result))
    }

    fn gt(&mut self, lhs: &EncryptedUint, rhs: &EncryptedUint)
        -> Result<EncryptedBool, RuntimeError> {
        let result = self.uint(lhs)? > self.uint(rhs)?;
        Ok(self.new_bool(result))
    }

    fn ne_constant(&mut self, lhs: &EncryptedUint, rhs: u128)
        -> Result<EncryptedBool, RuntimeError> {
        let result = self.uint(lhs)? != rhs;
        Ok(self.new_bool(result))
    }

    fn and(&mut self, lhs: &EncryptedBool, rhs: &EncryptedBool)
        -> Result<EncryptedBool, RuntimeError> {
        let result = self.boolean(lhs)? && self.boolean(rhs)?;
        Ok(self.new_bool(result))
    }

    fn bool_to_uint(&mut self, value: &EncryptedBool) -> Result<EncryptedUint, RuntimeError> {
        let v = self.boolean(value)? as u128;
        Ok(self.new_uint(v))
    }

    fn allow(&mut self, handle: Handle, account: &Address) -> Result<(), RuntimeError> {
        if !self.values.contains_key(&handle) {
            return Err(RuntimeError::UnknownHandle(handle));
        }
        self.acl.insert((handle, *account));
        Ok(())
    }

    fn is_allowed(&self, handle: Handle, account: &Address) -> bool {
        self.acl.contains(&(handle, *account))
    }

    fn request_decryption(
        &mut self,
        handles: &[Handle],
        requester: &Address,
    ) -> Result<DecryptionToken, RuntimeError> {
        for handle in handles {
            if !self.is_allowed(*handle, requester) {
                return Err(RuntimeError::NotAllowed {
                    handle: *handle,
                    account: *requester,
                });
            }
        }
        let token = DecryptionToken(self.next_token);
        self.next_token += 1;
        self.pending.insert(token, handles.to_vec());
        Ok(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTRACT: Address = Address([1; 32]);
    const ALICE: Address = Address([2; 32]);
    const BOB: Address = Address([3; 32]);

    #[test]
    fn inputs_are_scoped() {
        let mut runtime = MockRuntime::default();
        let input = runtime.encrypt_input(1, &CONTRACT, &ALICE);

        runtime.verify_input(&input, &CONTRACT, &ALICE).unwrap();
        assert_eq!(
            runtime.verify_input(&input, &CONTRACT, &BOB),
            Err(RuntimeError::InputScopeMismatch)
        );
        assert_eq!(
            runtime.verify_input(&input, &Address([9; 32]), &ALICE),
            Err(RuntimeError::InputScopeMismatch)
        );

        let mut tampered = input.clone();
        tampered.proof[0] ^= 1;
        assert_eq!(
            runtime.verify_input(&tampered, &CONTRACT, &ALICE),
            Err(RuntimeError::InvalidInputProof)
        );
    }

    #[test]
    fn homomorphic_ops() {
        let mut runtime = MockRuntime::default();
        let two = runtime.encrypt_constant(2);
        let three = runtime.encrypt_constant(3);

        let five = runtime.add(&two, &three).unwrap();
        assert_eq!(runtime.peek(five.handle()), Some(Cleartext::Uint(5)));

        let ten = runtime.mul_constant(&five, 2).unwrap();
        let gt = runtime.gt(&ten, &five).unwrap();
        let ge = runtime.ge(&five, &ten).unwrap();
        assert_eq!(runtime.peek(gt.handle()), Some(Cleartext::Bool(true)));
        assert_eq!(runtime.peek(ge.handle()), Some(Cleartext::Bool(false)));

        let both = runtime.and(&gt, &ge).unwrap();
        assert_eq!(runtime.peek(both.handle()), Some(Cleartext::Bool(false)));

        let nonzero = runtime.ne_constant(&ten, 0).unwrap();
        let bit = runtime.bool_to_uint(&nonzero).unwrap();
        assert_eq!(runtime.peek(bit.handle()), Some(Cleartext::Uint(1)));

        assert_eq!(
            runtime.mul_constant(&ten, u128::MAX),
            Err(RuntimeError::Overflow)
        );
        assert_eq!(
            runtime.bool_to_uint(&EncryptedBool::from_handle(ten.handle())),
            Err(RuntimeError::TypeMismatch)
        );
    }

    #[test]
    fn decryption_requires_access() {
        let mut runtime = MockRuntime::default();
        let value = runtime.encrypt_constant(1);
        let flag = runtime.ne_constant(&value, 0).unwrap();

        assert!(matches!(
            runtime.request_decryption(&[flag.handle()], &CONTRACT),
            Err(RuntimeError::NotAllowed { .. })
        ));

        runtime.allow(flag.handle(), &CONTRACT).unwrap();
        assert!(runtime.is_allowed(flag.handle(), &CONTRACT));
        let token = runtime
            .request_decryption(&[flag.handle()], &CONTRACT)
            .unwrap();
        assert_eq!(runtime.pending_decryptions(), vec![token]);

        let delivered = runtime.fulfil_decryptions();
        assert_eq!(delivered, vec![(token, vec![Cleartext::Bool(true)])]);
        assert!(runtime.pending_decryptions().is_empty());
    }
}
