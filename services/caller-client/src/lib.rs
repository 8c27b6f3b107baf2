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
//! # Oracle Caller Client 🕸️
//!
//! Drives the `CallerContract` side of the oracle: points it at the oracle contract, then
//! keeps asking for a fresh ETH price and logs what comes back.

use std::sync::Arc;

use ethers::providers::Middleware;
use ethers::types::{Address, H256};
use oracle_relayer_contract::CallerContract;
use oracle_relayer_utils::{Error, Result};

/// A thin client over the caller contract.
#[derive(Debug)]
pub struct CallerClient<M> {
    contract: CallerContract<M>,
}

impl<M> CallerClient<M>
where
    M: Middleware + 'static,
{
    /// Creates a client of the caller contract at `address`.
    pub fn new(address: Address, client: Arc<M>) -> Self {
        Self {
            contract: CallerContract::new(address, client),
        }
    }

    /// Tells the caller contract where the oracle lives.
    #[tracing::instrument(skip(self))]
    pub async fn point_at_oracle(&self, oracle: Address) -> Result<H256> {
        const METHOD: &str = "setOracleInstanceAddress";
        let call = self.contract.set_oracle_instance_address(oracle);
        let pending = call
            .send()
            .await
            .map_err(|e| Error::transaction_failed(METHOD, e))?;
        Ok(*pending)
    }

    /// Asks for a fresh ETH price, the answer arrives later as a `PriceUpdatedEvent`.
    pub async fn request_price(&self) -> Result<H256> {
        const METHOD: &str = "updateEthPrice";
        let call = self.contract.update_eth_price();
        let pending = call
            .send()
            .await
            .map_err(|e| Error::transaction_failed(METHOD, e))?;
        Ok(*pending)
    }
}
