//! The two chains the signing core knows about.

/// Which deployment a signature is scoped to. Mainnet and testnet use
/// different host-chain EIP-712 domains and different `Agent.source` tags,
/// but otherwise sign identically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chain {
    Mainnet,
    Testnet,
}

impl Chain {
    pub fn is_mainnet(self) -> bool {
        matches!(self, Chain::Mainnet)
    }

    /// The human-readable tag embedded in typed-data payloads
    /// (`hyperliquidChain`).
    pub fn hyperliquid_chain_name(self) -> &'static str {
        match self {
            Chain::Mainnet => "Mainnet",
            Chain::Testnet => "Testnet",
        }
    }

    /// The host-chain id used in the typed-data domain and embedded as hex
    /// text in the wire JSON's `signatureChainId`.
    pub fn chain_id(self) -> u64 {
        match self {
            Chain::Mainnet => 42161,
            Chain::Testnet => 421614,
        }
    }

    /// `signatureChainId` as lowercase `0x`-prefixed hex, matching the
    /// teacher SDK's `Chain::arbitrum_id`.
    pub fn signature_chain_id(self) -> &'static str {
        match self {
            Chain::Mainnet => "0xa4b1",
            Chain::Testnet => "0x66eee",
        }
    }

    /// The `source` tag embedded in the Agent struct for the RMP path.
    pub fn agent_source(self) -> &'static str {
        if self.is_mainnet() { "a" } else { "b" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mainnet_and_testnet_have_distinct_chain_ids() {
        assert_ne!(Chain::Mainnet.chain_id(), Chain::Testnet.chain_id());
    }

    #[test]
    fn agent_source_matches_mainnet_convention() {
        assert_eq!(Chain::Mainnet.agent_source(), "a");
        assert_eq!(Chain::Testnet.agent_source(), "b");
    }
}
