//! Canonical message construction.
//!
//! The text is opaque to the chains: it is displayed to the signer and kept
//! verbatim for audit display, never parsed.

use alloy::primitives::Address;
use jiff::Timestamp;

use crate::config::schema::ProgramConfig;

/// Inputs to the signed message for one attempt.
#[derive(Debug, Clone)]
pub struct MessageParams<'a> {
    pub program: &'a ProgramConfig,
    pub address: &'a Address,
    pub networks: &'a [&'a str],
    pub timestamp: Timestamp,
    pub nonce: u64,
}

/// Build the message text. Identical inputs always yield identical text.
pub fn build_message(params: &MessageParams<'_>) -> String {
    let program = params.program;
    format!(
        "{identifier}\n\n\
         I confirm my participation in {identifier}\n\
         Wallet: {address}\n\
         Allocation: {amount} {symbol} + {bonus}% Bonus\n\
         Networks: {networks}\n\
         Timestamp: {timestamp}\n\
         Nonce: {nonce}",
        identifier = program.identifier,
        address = params.address,
        amount = program.allocation_amount,
        symbol = program.token_symbol,
        bonus = program.current_bonus_pct,
        networks = params.networks.join(", "),
        timestamp = params.timestamp,
        nonce = params.nonce,
    )
}

/// Attempt identifier sent to the backend, derived from the attempt timestamp.
///
/// The low bits of the nonce disambiguate attempts started in the same millisecond.
pub fn flow_id(timestamp: Timestamp, nonce: u64) -> String {
    format!("SIG-{}-{:04x}", timestamp.as_millisecond(), nonce & 0xffff)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const WALLET: Address = address!("abc0000000000000000000000000000000000def");

    fn params<'a>(program: &'a ProgramConfig, networks: &'a [&'a str], nonce: u64) -> MessageParams<'a> {
        MessageParams {
            program,
            address: &WALLET,
            networks,
            timestamp: Timestamp::from_second(1_700_000_000).unwrap(),
            nonce,
        }
    }

    #[test]
    fn test_message_embeds_inputs() {
        let program = ProgramConfig::default();
        let networks = ["Ethereum", "BSC", "Polygon"];
        let message = build_message(&params(&program, &networks, 424242));

        assert!(message.starts_with("MULTICHAIN VERIFICATION\n\n"));
        assert!(message.contains(&format!("Wallet: {}", WALLET)));
        assert!(message.contains("Allocation: 5000 TOKEN + 25% Bonus"));
        assert!(message.contains("Networks: Ethereum, BSC, Polygon"));
        assert!(message.contains("Timestamp: 2023-11-14T22:13:20Z"));
        assert!(message.ends_with("Nonce: 424242"));
    }

    #[test]
    fn test_message_is_deterministic() {
        let program = ProgramConfig::default();
        let networks = ["Ethereum"];
        assert_eq!(
            build_message(&params(&program, &networks, 1)),
            build_message(&params(&program, &networks, 1))
        );
        assert_ne!(
            build_message(&params(&program, &networks, 1)),
            build_message(&params(&program, &networks, 2))
        );
    }

    #[test]
    fn test_flow_id_format() {
        let ts = Timestamp::from_millisecond(1_700_000_000_123).unwrap();
        assert_eq!(flow_id(ts, 0x1_2345), "SIG-1700000000123-2345");
    }
}
