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

use std::sync::Arc;

use ethers::providers::Middleware;
use ethers::types::{Address, H256, U256};
use oracle_relayer_utils::{Error, Result};

use crate::EthPriceOracle;

/// A write the relayer makes to the oracle contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OracleCall {
    /// `setLatestEthPrice(price, caller, id)`, answers request `id` of `caller`.
    SetLatestEthPrice {
        /// The fixed-point price, `0` marks a failed resolution.
        price: U256,
        /// The caller contract that asked for the price.
        caller: Address,
        /// The request id.
        id: U256,
    },
    /// `addOracle(oracle)`, registers an oracle account.
    AddOracle {
        /// The account being registered.
        oracle: Address,
    },
    /// `setThreshold(threshold)`, the minimum number of oracle responses.
    SetThreshold {
        /// The new threshold.
        threshold: U256,
    },
}

impl OracleCall {
    /// The Solidity name of the contract method.
    pub fn method(&self) -> &'static str {
        match self {
            Self::SetLatestEthPrice { .. } => "setLatestEthPrice",
            Self::AddOracle { .. } => "addOracle",
            Self::SetThreshold { .. } => "setThreshold",
        }
    }
}

/// The seam between the relayer and the chain.
///
/// Everything that writes on-chain goes through here, so the batch processor and the driver
/// can be exercised against a recording implementation in tests. The contract address is
/// resolved up front with [`crate::artifact::resolve_contract_instance`].
#[async_trait::async_trait]
pub trait ContractGateway: Send + Sync {
    /// Submits `call` from the `from` account.
    ///
    /// Returns the transaction hash as soon as the node accepted the transaction, without
    /// waiting for it to be mined. Fails with [`Error::TransactionFailed`] when the call
    /// reverts, gets rejected or the transport errors.
    async fn send_write(&self, call: OracleCall, from: Address) -> Result<H256>;

    /// The accounts the relayer can send transactions from.
    async fn accounts(&self) -> Result<Vec<Address>>;
}

#[async_trait::async_trait]
impl<G> ContractGateway for Arc<G>
where
    G: ContractGateway + ?Sized,
{
    async fn send_write(&self, call: OracleCall, from: Address) -> Result<H256> {
        G::send_write(self, call, from).await
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        G::accounts(self).await
    }
}

/// A [`ContractGateway`] backed by an ethers [`Middleware`], usually a `SignerMiddleware`
/// holding the relayer's wallet.
#[derive(Debug)]
pub struct EthersContractGateway<M> {
    contract: EthPriceOracle<M>,
    client: Arc<M>,
    gas_limit: U256,
    accounts: Vec<Address>,
}

impl<M> EthersContractGateway<M>
where
    M: Middleware + 'static,
{
    /// Creates a gateway to the oracle contract at `address`.
    ///
    /// Every write is sent with `gas_limit` as its gas ceiling.
    pub fn new(address: Address, client: Arc<M>, gas_limit: impl Into<U256>) -> Self {
        Self {
            contract: EthPriceOracle::new(address, client.clone()),
            client,
            gas_limit: gas_limit.into(),
            accounts: Vec::new(),
        }
    }

    /// Uses `accounts` as the signing accounts instead of asking the node for them.
    ///
    /// A local wallet is not known to the node, so this is how its address is reported.
    pub fn with_accounts(mut self, accounts: Vec<Address>) -> Self {
        self.accounts = accounts;
        self
    }

    /// The oracle contract this gateway writes to.
    pub fn contract(&self) -> &EthPriceOracle<M> {
        &self.contract
    }
}

#[async_trait::async_trait]
impl<M> ContractGateway for EthersContractGateway<M>
where
    M: Middleware + 'static,
{
    #[tracing::instrument(
        skip_all,
        fields(method = call.method(), from = ?from),
    )]
    async fn send_write(&self, call: OracleCall, from: Address) -> Result<H256> {
        let method = call.method();
        let contract_call = match call {
            OracleCall::SetLatestEthPrice { price, caller, id } => {
                self.contract.set_latest_eth_price(price, caller, id)
            }
            OracleCall::AddOracle { oracle } => self.contract.add_oracle(oracle),
            OracleCall::SetThreshold { threshold } => {
                self.contract.set_threshold(threshold)
            }
        }
        .from(from)
        .gas(self.gas_limit);
        // dry run, the gas is fixed so a revert would otherwise go unnoticed.
        contract_call
            .call()
            .await
            .map_err(|e| Error::transaction_failed(method, e))?;
        let pending = contract_call
            .send()
            .await
            .map_err(|e| Error::transaction_failed(method, e))?;
        let tx_hash = *pending;
        tracing::debug!(?tx_hash, "Tx is submitted and pending!");
        Ok(tx_hash)
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        if !self.accounts.is_empty() {
            return Ok(self.accounts.clone());
        }
        self.client
            .get_accounts()
            .await
            .map_err(|e| Error::SetupFailed {
                step: "accounts",
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use ethers::providers::Provider;

    use super::*;

    #[test]
    fn method_names_match_the_contract() {
        let caller = Address::zero();
        assert_eq!(
            OracleCall::SetLatestEthPrice {
                price: U256::zero(),
                caller,
                id: U256::one(),
            }
            .method(),
            "setLatestEthPrice"
        );
        assert_eq!(OracleCall::AddOracle { oracle: caller }.method(), "addOracle");
        assert_eq!(
            OracleCall::SetThreshold {
                threshold: U256::one()
            }
            .method(),
            "setThreshold"
        );
    }

    #[tokio::test]
    async fn transport_errors_are_transaction_failures() {
        let (provider, _mock) = Provider::mocked();
        let gateway = EthersContractGateway::new(
            Address::from_low_u64_be(1),
            Arc::new(provider),
            3_000_000u64,
        );
        let err = gateway
            .send_write(
                OracleCall::AddOracle {
                    oracle: Address::from_low_u64_be(2),
                },
                Address::from_low_u64_be(2),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::TransactionFailed {
                method: "addOracle",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn configured_accounts_are_reported_without_asking_the_node() {
        let (provider, _mock) = Provider::mocked();
        let wallet = Address::from_low_u64_be(0xAB);
        let gateway = EthersContractGateway::new(
            Address::from_low_u64_be(1),
            Arc::new(provider),
            3_000_000u64,
        )
        .with_accounts(vec![wallet]);
        assert_eq!(gateway.accounts().await.unwrap(), vec![wallet]);
    }

    #[tokio::test]
    async fn node_accounts_are_used_otherwise() {
        let (provider, mock) = Provider::mocked();
        let node_account = Address::from_low_u64_be(0xCD);
        mock.push::<Vec<Address>, _>(vec![node_account]).unwrap();
        let gateway = EthersContractGateway::new(
            Address::from_low_u64_be(1),
            Arc::new(provider),
            3_000_000u64,
        );
        assert_eq!(gateway.accounts().await.unwrap(), vec![node_account]);
    }
}
