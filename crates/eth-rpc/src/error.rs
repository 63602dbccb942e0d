use eth_core::EthError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("http status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("node error {code}: {message}")]
    Node { code: i64, message: String },

    #[error("no result returned for {0}")]
    MissingResult(String),

    #[error("invalid quantity: {0}")]
    InvalidQuantity(String),

    #[error("invalid hex data: {0}")]
    InvalidHex(String),

    #[error("contract error: {0}")]
    Contract(#[from] EthError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_error_display() {
        let err = RpcError::Node {
            code: -32000,
            message: "nonce too low".into(),
        };
        assert_eq!(err.to_string(), "node error -32000: nonce too low");
    }

    #[test]
    fn contract_error_wraps_eth_error() {
        let err: RpcError = EthError::InvalidAddress("0x12".into()).into();
        assert!(matches!(err, RpcError::Contract(_)));
        assert!(err.to_string().contains("0x12"));
    }
}
