use crate::*;
use ed25519_dalek::Keypair;
use ed25519_dalek::PublicKey;
use ed25519_dalek::SecretKey;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::convert::TryInto;
use std::str::FromStr;

pub fn generate_keypair() -> (SecretKey, PublicKey) {
    let mut csprng = rand::rngs::OsRng {};
    let Keypair { public, secret } = Keypair::generate(&mut csprng);
    (secret, public)
}

/// An account on the host ledger
///
/// Accounts are identified by the bytes of their ed25519 public key.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(pub [u8; 32]);

impl Address {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<&PublicKey> for Address {
    fn from(public: &PublicKey) -> Self {
        Address(public.to_bytes())
    }
}

impl From<PublicKey> for Address {
    fn from(public: PublicKey) -> Self {
        Address::from(&public)
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Address(bytes)
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Address(parse_bytes32(s)?))
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl Serialize for Address {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Address::from_str(&s).map_err(de::Error::custom)
    }
}

/// Parse a 32 byte word from hex, with or without a leading `0x`
pub fn parse_bytes32(s: &str) -> Result<[u8; 32], Error> {
    let s = s.trim();
    let s = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(s).map_err(|_| Error::BadHex)?;
    bytes.as_slice().try_into().map_err(|_| Error::BadLen {
        expected: 32,
        found: bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_from_public_key() {
        let (_secret, public) = generate_keypair();
        let address = Address::from(&public);
        assert_eq!(address.as_bytes(), public.as_bytes());

        let parsed: Address = address.to_string().parse().unwrap();
        assert_eq!(parsed, address);

        let prefixed: Address = format!("0x{}", address).parse().unwrap();
        assert_eq!(prefixed, address);
    }

    #[test]
    fn parse_bytes32_rejects_bad_input() {
        assert!(matches!(parse_bytes32("zz"), Err(Error::BadHex)));
        assert!(matches!(
            parse_bytes32("ffff"),
            Err(Error::BadLen {
                expected: 32,
                found: 2
            })
        ));
    }
}
