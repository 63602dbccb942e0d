use serde::Serialize;

/// An Ethereum network the transfer tool knows how to label.
#[derive(Debug, Clone, Serialize)]
pub struct EthNetwork {
    pub chain_id: u64,
    pub name: &'static str,
    pub symbol: &'static str,
    pub explorer_url: &'static str,
    pub is_testnet: bool,
}

/// Ethereum Mainnet (chain ID 1).
pub const MAINNET: EthNetwork = EthNetwork {
    chain_id: 1,
    name: "Ethereum",
    symbol: "ETH",
    explorer_url: "https://etherscan.io",
    is_testnet: false,
};

/// Ropsten proof-of-work testnet (chain ID 3), deprecated.
pub const ROPSTEN: EthNetwork = EthNetwork {
    chain_id: 3,
    name: "Ropsten",
    symbol: "ETH",
    explorer_url: "https://ropsten.etherscan.io",
    is_testnet: true,
};

/// Rinkeby testnet (chain ID 4), deprecated.
pub const RINKEBY: EthNetwork = EthNetwork {
    chain_id: 4,
    name: "Rinkeby",
    symbol: "ETH",
    explorer_url: "https://rinkeby.etherscan.io",
    is_testnet: true,
};

/// Goerli testnet (chain ID 5), deprecated.
pub const GOERLI: EthNetwork = EthNetwork {
    chain_id: 5,
    name: "Goerli",
    symbol: "ETH",
    explorer_url: "https://goerli.etherscan.io",
    is_testnet: true,
};

/// Kovan testnet (chain ID 42), deprecated.
pub const KOVAN: EthNetwork = EthNetwork {
    chain_id: 42,
    name: "Kovan",
    symbol: "ETH",
    explorer_url: "https://kovan.etherscan.io",
    is_testnet: true,
};

/// Holesky testnet (chain ID 17000).
pub const HOLESKY: EthNetwork = EthNetwork {
    chain_id: 17000,
    name: "Holesky",
    symbol: "ETH",
    explorer_url: "https://holesky.etherscan.io",
    is_testnet: true,
};

/// Sepolia testnet (chain ID 11155111).
pub const SEPOLIA: EthNetwork = EthNetwork {
    chain_id: 11155111,
    name: "Sepolia",
    symbol: "ETH",
    explorer_url: "https://sepolia.etherscan.io",
    is_testnet: true,
};

const ALL_NETWORKS: &[&EthNetwork] = &[
    &MAINNET, &ROPSTEN, &RINKEBY, &GOERLI, &KOVAN, &HOLESKY, &SEPOLIA,
];

/// Returns the network for a chain ID, or `None` if it is not in the table.
pub fn get_network(chain_id: u64) -> Option<&'static EthNetwork> {
    ALL_NETWORKS
        .iter()
        .find(|n| n.chain_id == chain_id)
        .copied()
}

/// Returns every known network.
pub fn known_networks() -> Vec<&'static EthNetwork> {
    ALL_NETWORKS.to_vec()
}

/// Native currency symbol for a chain, `ETH` when the chain is unknown.
pub fn native_symbol(chain_id: u64) -> &'static str {
    get_network(chain_id).map_or("ETH", |n| n.symbol)
}

/// Block explorer page of a transaction, if the chain has a known explorer.
pub fn explorer_tx_url(chain_id: u64, tx_hash: &str) -> Option<String> {
    get_network(chain_id).map(|n| format!("{}/tx/{tx_hash}", n.explorer_url))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_mainnet() {
        let network = get_network(1).expect("mainnet should be known");
        assert_eq!(network.name, "Ethereum");
        assert!(!network.is_testnet);
    }

    #[test]
    fn get_ropsten() {
        let network = get_network(3).expect("Ropsten should be known");
        assert_eq!(network.name, "Ropsten");
        assert!(network.is_testnet);
    }

    #[test]
    fn unknown_chain_returns_none() {
        assert!(get_network(999_999).is_none());
    }

    #[test]
    fn known_networks_are_unique() {
        let networks = known_networks();
        assert_eq!(networks.len(), 7);
        for (i, a) in networks.iter().enumerate() {
            for b in &networks[i + 1..] {
                assert_ne!(a.chain_id, b.chain_id);
            }
        }
    }

    #[test]
    fn only_mainnet_is_not_a_testnet() {
        let mainnets: Vec<_> = known_networks().into_iter().filter(|n| !n.is_testnet).collect();
        assert_eq!(mainnets.len(), 1);
        assert_eq!(mainnets[0].chain_id, 1);
    }

    #[test]
    fn all_explorers_are_https() {
        for network in known_networks() {
            assert!(
                network.explorer_url.starts_with("https://"),
                "{} explorer_url should start with https://",
                network.name
            );
        }
    }

    #[test]
    fn native_symbol_falls_back_to_eth() {
        assert_eq!(native_symbol(3), "ETH");
        assert_eq!(native_symbol(424_242), "ETH");
    }

    #[test]
    fn explorer_tx_url_for_known_chain() {
        assert_eq!(
            explorer_tx_url(3, "0xabc").as_deref(),
            Some("https://ropsten.etherscan.io/tx/0xabc")
        );
        assert!(explorer_tx_url(424_242, "0xabc").is_none());
    }
}
