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
//! # Relayer Context Module 🕸️
//!
//! A module for managing the context of the relayer.
use std::convert::TryFrom;
use std::sync::Arc;

use ethers::prelude::*;
use oracle_price_oracle_backends::{
    PriceBackend, PriceQuote, StaticPriceBackend, TickerPriceBackend,
};
use oracle_relayer_config::evm::ContractConfig;
use oracle_relayer_config::OracleRelayerConfig;
use oracle_relayer_contract::resolve_contract_instance;
use oracle_relayer_utils::{Error, Result};

/// The Ethereum client used for reading, it polls filters at the configured interval.
pub type EthersClient = Provider<Http>;

/// The Ethereum client used for writing, signing with the relayer's wallet.
pub type SignerClient = SignerMiddleware<EthersClient, LocalWallet>;

/// RelayerContext contains Relayer's configuration, and builds everything that talks to the
/// outside world from it.
#[derive(Clone)]
pub struct RelayerContext {
    /// The configuration of the relayer.
    pub config: OracleRelayerConfig,
}

impl RelayerContext {
    /// Creates a new RelayerContext.
    pub fn new(config: OracleRelayerConfig) -> Self {
        Self { config }
    }

    /// Returns a new `EthereumProvider` for the relayer.
    pub fn evm_provider(&self) -> Result<EthersClient> {
        let chain = &self.config.evm;
        let provider = Provider::<Http>::try_from(chain.http_endpoint.as_str())?
            .interval(chain.polling_interval());
        Ok(provider)
    }

    /// Sets up and returns an EVM wallet for the relayer.
    pub fn evm_wallet(&self) -> Result<LocalWallet> {
        let chain = &self.config.evm;
        let private_key =
            chain.private_key.as_ref().ok_or(Error::MissingSecrets)?;
        let wallet = LocalWallet::from_bytes(private_key.as_bytes())?
            .with_chain_id(chain.chain_id);
        Ok(wallet)
    }

    /// The provider and the wallet, put together.
    pub fn signer_client(&self) -> Result<Arc<SignerClient>> {
        let provider = self.evm_provider()?;
        let wallet = self.evm_wallet()?;
        Ok(Arc::new(SignerMiddleware::new(provider, wallet)))
    }

    /// Returns the price backend for fetching prices.
    ///
    /// A configured static `price` wins over the ticker.
    pub fn price_backend(&self) -> Result<Arc<dyn PriceBackend>> {
        let source = &self.config.price_source;
        if let Some(price) = &source.price {
            let quote: PriceQuote = price.parse()?;
            tracing::warn!(%quote, "Using a static price source");
            return Ok(Arc::new(StaticPriceBackend::new(quote)));
        }
        let backend = TickerPriceBackend::new(
            source.url.clone(),
            source.symbol.clone(),
            source.timeout(),
        )?;
        Ok(Arc::new(backend))
    }

    /// The network id (`net_version`) of the connected chain, the key of Truffle artifacts.
    pub async fn network_id<M>(&self, client: &M) -> Result<String>
    where
        M: Middleware,
    {
        client
            .get_net_version()
            .await
            .map_err(|e| Error::SetupFailed {
                step: "net_version",
                reason: e.to_string(),
            })
    }

    /// The address of the oracle contract on the network `network_id`.
    pub fn oracle_address(&self, network_id: &str) -> Result<Address> {
        resolve(&self.config.evm.oracle, network_id)
    }

    /// The address of the caller contract on the network `network_id`.
    pub fn caller_address(&self, network_id: &str) -> Result<Address> {
        let caller = self.config.evm.caller.as_ref().ok_or_else(|| {
            Error::InvalidConfig("missing the `evm.caller` contract".into())
        })?;
        resolve(caller, network_id)
    }
}

fn resolve(contract: &ContractConfig, network_id: &str) -> Result<Address> {
    resolve_contract_instance(
        contract.address,
        contract.artifact.as_deref(),
        network_id,
    )
}
