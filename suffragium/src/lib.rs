//! Confidential, sybil-resistant voting.
//!
//! Voters prove control of an email address from a configured domain with a succinct proof,
//! cast a homomorphically encrypted yes/no ballot, and the aggregate decision is revealed through
//! an asynchronous decryption oracle once the voting window closes.

#[macro_use]
extern crate serde;

#[macro_use]
extern crate log;

mod ciphertext;
mod config;
mod error;
mod event;
mod identity;
mod ledger;
mod nullifier;
mod public_values;
mod reveal;
mod serde_hex;
mod transaction;
mod util;
mod vote;

pub mod mock;

pub use ciphertext::*;
pub use config::*;
pub use error::*;
pub use event::*;
pub use identity::*;
pub use ledger::*;
pub use nullifier::*;
pub use public_values::*;
pub use reveal::*;
pub use serde_hex::*;
pub use transaction::*;
pub use util::*;
pub use vote::*;
