use ed25519_dalek::SecretKey;
use std::env::var;
use std::str::FromStr;
use suffragium::{parse_bytes32, Address, Config, QUORUM_SCALE};

const PERCENT: u64 = QUORUM_SCALE / 100;

/// Build a ledger `Config` from `SUFFRAGIUM_*` environment variables.
///
/// The contract, owner and oracle addresses and the three hashes are required; the quorum
/// (as a percentage) and the size of the electorate are optional.
pub fn config_from_env() -> Result<Config, String> {
    let mut config = Config::new(
        address_var("SUFFRAGIUM_CONTRACT")?,
        address_var("SUFFRAGIUM_OWNER")?,
        address_var("SUFFRAGIUM_ORACLE")?,
        bytes32_var("SUFFRAGIUM_VERIFICATION_KEY")?,
        bytes32_var("SUFFRAGIUM_EMAIL_PUBLIC_KEY_HASH")?,
        bytes32_var("SUFFRAGIUM_FROM_DOMAIN_HASH")?,
    );

    if let Ok(val) = var("SUFFRAGIUM_MIN_QUORUM") {
        config.min_quorum = parse_quorum(&val)?;
    }

    if let Ok(val) = var("SUFFRAGIUM_ELIGIBLE_VOTERS") {
        let eligible = val
            .parse()
            .map_err(|e| format!("SUFFRAGIUM_ELIGIBLE_VOTERS: {}", e))?;
        config.eligible_voters = Some(eligible);
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn required_var(name: &str) -> Result<String, String> {
    var(name).map_err(|_| format!("{} environment variable must be set", name))
}

fn address_var(name: &str) -> Result<Address, String> {
    Address::from_str(&required_var(name)?).map_err(|e| format!("{}: {}", name, e))
}

fn bytes32_var(name: &str) -> Result<[u8; 32], String> {
    parse_bytes32(&required_var(name)?).map_err(|e| format!("{}: {}", name, e))
}

pub fn parse_secret_key(hex_key: &str) -> Result<SecretKey, String> {
    let bytes = hex::decode(hex_key.trim()).map_err(|e| e.to_string())?;
    SecretKey::from_bytes(&bytes).map_err(|e| e.to_string())
}

/// Parse a percentage such as `50` or `66.5` into the fixed-point quorum representation
pub fn parse_quorum(percent: &str) -> Result<u64, String> {
    let invalid = || format!("invalid quorum percentage: {}", percent);

    let percent = percent.trim().trim_end_matches('%');
    let (whole, fraction) = match percent.find('.') {
        Some(dot) => (&percent[..dot], &percent[dot + 1..]),
        None => (percent, ""),
    };

    // 1% is 1e16, so at most 16 fractional digits are meaningful
    if fraction.len() > 16 || !fraction.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid());
    }
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().map_err(|_| invalid())?
    };
    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        let digits: u64 = fraction.parse().map_err(|_| invalid())?;
        digits * 10u64.pow(16 - fraction.len() as u32)
    };

    if whole > 100 || (whole == 100 && fraction > 0) {
        return Err(format!("quorum cannot exceed 100%: {}", percent));
    }
    Ok(whole * PERCENT + fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quorum_percentages() {
        assert_eq!(parse_quorum("50").unwrap(), QUORUM_SCALE / 2);
        assert_eq!(parse_quorum("100%").unwrap(), QUORUM_SCALE);
        assert_eq!(parse_quorum("0").unwrap(), 0);
        assert_eq!(parse_quorum("80.0").unwrap(), QUORUM_SCALE / 10 * 8);
        assert_eq!(parse_quorum("66.5").unwrap(), QUORUM_SCALE / 1000 * 665);

        assert_eq!(parse_quorum(".5").unwrap(), QUORUM_SCALE / 200);
        assert_eq!(parse_quorum("0.25").unwrap(), QUORUM_SCALE / 400);

        assert!(parse_quorum("").is_err());
        assert!(parse_quorum(".").is_err());
        assert!(parse_quorum("100.5").is_err());
        assert!(parse_quorum("101").is_err());
        assert!(parse_quorum("-1").is_err());
        assert!(parse_quorum("half").is_err());
        assert!(parse_quorum("1.2.3").is_err());
    }
}
