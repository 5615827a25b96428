use thiserror::Error;

/// Failure to set up the client channel. Always fatal.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("invalid address {addr:?}: {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("address {addr:?} uses scheme {scheme:?}, only plaintext http is supported")]
    UnsupportedScheme { addr: String, scheme: String },
}
