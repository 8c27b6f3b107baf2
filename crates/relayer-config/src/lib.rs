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

#![warn(missing_docs)]

//! # Oracle Relayer Configuration Module 🕸️
//!
//! A module for configuring the oracle relayer.
//!
//! ## Overview
//!
//! The configuration is read from all the `toml`/`json` files of a directory and merged with
//! the environment. Possible configuration include:
//! * `evm`: the network the oracle contract lives on, the relayer key and where the contracts are.
//! * `relay`: how often and how much of the request queue is processed.
//! * `setup`: the one-time oracle registration done at startup.
//! * `price_source`: where prices come from.

/// CLI configuration
#[cfg(feature = "cli")]
pub mod cli;
/// Default values of the configuration.
pub mod defaults;
/// EVM configuration
pub mod evm;
/// Utils for processing configuration
pub mod utils;

use std::time::Duration;

use evm::EvmChainConfig;
use serde::{Deserialize, Serialize};

/// OracleRelayerConfig is the configuration for the oracle relayer.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OracleRelayerConfig {
    /// The EVM network the oracle contract is deployed on.
    pub evm: EvmChainConfig,
    /// Request queue processing.
    #[serde(default)]
    pub relay: RelayConfig,
    /// One-time setup performed before processing requests.
    #[serde(default)]
    pub setup: SetupConfig,
    /// The external price data source.
    #[serde(default)]
    pub price_source: PriceSourceConfig,
}

impl OracleRelayerConfig {
    /// Makes sure that the config is valid, by going
    /// through the whole config and doing some basic checks.
    pub fn verify(&self) -> oracle_relayer_utils::Result<()> {
        use oracle_relayer_utils::Error;
        if self.evm.private_key.is_none() {
            return Err(Error::MissingSecrets);
        }
        if self.relay.chunk_size == 0 {
            return Err(Error::InvalidConfig(
                "relay.chunk_size must be at least 1".into(),
            ));
        }
        if self.relay.max_retries == 0 {
            return Err(Error::InvalidConfig(
                "relay.max_retries must be at least 1".into(),
            ));
        }
        if self.relay.price_scale > defaults::MAX_PRICE_SCALE {
            return Err(Error::InvalidConfig(format!(
                "relay.price_scale must be at most {}",
                defaults::MAX_PRICE_SCALE
            )));
        }
        if self.evm.oracle.is_unset() {
            return Err(Error::InvalidConfig(
                "evm.oracle needs an address or an artifact".into(),
            ));
        }
        Ok(())
    }
}

/// RelayConfig controls the batch processing of the request queue.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RelayConfig {
    /// Milliseconds to sleep between two processing cycles.
    #[serde(default = "defaults::sleep_interval")]
    pub sleep_interval: u64,
    /// The maximum number of requests processed in one cycle.
    #[serde(default = "defaults::chunk_size")]
    pub chunk_size: usize,
    /// Attempts per request, after the last one a zero price is written.
    #[serde(default = "defaults::max_retries")]
    pub max_retries: usize,
    /// The number of decimal places kept in the on-chain price.
    #[serde(default = "defaults::price_scale")]
    pub price_scale: u32,
}

impl RelayConfig {
    /// The pause between two processing cycles.
    pub fn sleep_interval(&self) -> Duration {
        Duration::from_millis(self.sleep_interval)
    }
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            sleep_interval: defaults::sleep_interval(),
            chunk_size: defaults::chunk_size(),
            max_retries: defaults::max_retries(),
            price_scale: defaults::price_scale(),
        }
    }
}

/// SetupConfig controls what is done once at startup.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct SetupConfig {
    /// Register the relayer account as an oracle.
    #[serde(default = "defaults::register_oracle")]
    pub register_oracle: bool,
    /// The minimum number of oracle responses, set at startup.
    ///
    /// Set it to `0` to skip the call.
    #[serde(default = "defaults::threshold")]
    pub threshold: u64,
}

impl Default for SetupConfig {
    fn default() -> Self {
        Self {
            register_oracle: defaults::register_oracle(),
            threshold: defaults::threshold(),
        }
    }
}

/// PriceSourceConfig is the configuration of the external price data source.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PriceSourceConfig {
    /// The ticker endpoint.
    #[serde(default = "defaults::price_source_url")]
    pub url: url::Url,
    /// The trading pair asked for.
    #[serde(default = "defaults::price_symbol")]
    pub symbol: String,
    /// Request timeout in milliseconds.
    #[serde(default = "defaults::price_source_timeout")]
    pub timeout: u64,
    /// A fixed quote, when set no request is made at all.
    ///
    /// Useful for dry runs against a development chain.
    #[serde(default)]
    pub price: Option<String>,
}

impl PriceSourceConfig {
    /// Request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout)
    }
}

impl Default for PriceSourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::price_source_url(),
            symbol: defaults::price_symbol(),
            timeout: defaults::price_source_timeout(),
            price: None,
        }
    }
}
