// Copyright 2022 Webb Technologies Inc.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

#![deny(unsafe_code)]
#![warn(missing_docs)]
//! # Oracle Relayer Utils 🕸️
//!
//! The shared error type, retry policies and lifecycle probes used across
//! the oracle relayer crates.

/// A module used for debugging relayer lifecycle, queue state, or other relayer state.
pub mod probe;
/// Retry functionality
pub mod retry;

/// An enum of all possible errors that could be encountered during the execution of the
/// Oracle Relayer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An Io error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// JSON Error occurred.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// Config loading error.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// Error while iterating over a glob pattern.
    #[error(transparent)]
    GlobPattern(#[from] glob::PatternError),
    /// Error from Glob Iterator.
    #[error(transparent)]
    Glob(#[from] glob::GlobError),
    /// Error while parsing a URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),
    /// Error in Http Provider (ethers client).
    #[error(transparent)]
    EthersProvider(#[from] ethers::providers::ProviderError),
    /// Ether wallet errors.
    #[error(transparent)]
    EtherWalletError(#[from] ethers::signers::WalletError),
    /// Error while parsing the config files.
    #[error("Config parse error: {}", _0)]
    ParseConfig(#[from] serde_path_to_error::Error<config::ConfigError>),
    /// The configuration is loaded but does not make sense.
    #[error("Invalid config: {}", _0)]
    InvalidConfig(String),
    /// Missing Secrets in the config, the signing private key.
    #[error("Missing required private-key in the config")]
    MissingSecrets,
    /// Generic error.
    #[error("{}", _0)]
    Generic(&'static str),
    /// The price data source could not deliver a usable quote.
    ///
    /// Covers network failures, timeouts, non-success responses, unexpected body
    /// shapes, and quotes that are not a plain decimal number.
    #[error("Price source unavailable: {reason}")]
    SourceUnavailable {
        /// What went wrong.
        reason: String,
    },
    /// A write transaction was rejected, reverted, or could not be submitted.
    #[error("Transaction `{method}` failed: {reason}")]
    TransactionFailed {
        /// The contract method that was called.
        method: &'static str,
        /// The underlying error message.
        reason: String,
    },
    /// The event subscription transport hiccuped.
    #[error("Subscription error: {reason}")]
    SubscriptionError {
        /// The underlying error message.
        reason: String,
    },
    /// One of the one-time setup calls failed.
    #[error("Setup step `{step}` failed: {reason}")]
    SetupFailed {
        /// The setup step that failed.
        step: &'static str,
        /// The underlying error message.
        reason: String,
    },
    /// The contract has no deployment recorded for the network.
    #[error("Contract `{contract}` is not deployed on network {network_id}")]
    ContractNotDeployed {
        /// The contract name, as found in the artifact.
        contract: String,
        /// The network id (`net_version`).
        network_id: String,
    },
}

impl Error {
    /// Creates a [`Error::SourceUnavailable`] from anything printable.
    pub fn source_unavailable(reason: impl ToString) -> Self {
        Self::SourceUnavailable {
            reason: reason.to_string(),
        }
    }

    /// Creates a [`Error::TransactionFailed`] for the given contract method.
    pub fn transaction_failed(
        method: &'static str,
        reason: impl ToString,
    ) -> Self {
        Self::TransactionFailed {
            method,
            reason: reason.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        Error::source_unavailable(error)
    }
}

/// A type alias for the result for the oracle relayer, that uses the `Error` enum.
pub type Result<T> = std::result::Result<T, Error>;
