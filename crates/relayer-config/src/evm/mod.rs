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

use std::path::PathBuf;

use ethers::types::Address;
use oracle_relayer_types::{private_key::PrivateKey, rpc_url::RpcUrl};

use super::*;

/// EvmChainConfig is the configuration for the EVM network the oracle lives on.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EvmChainConfig {
    /// String that groups configuration for this chain on a human-readable name.
    pub name: String,
    /// Http(s) Endpoint for quick Req/Res
    #[serde(skip_serializing)]
    pub http_endpoint: RpcUrl,
    /// chain specific id (output of chainId opcode on EVM networks)
    pub chain_id: u64,
    /// The Private Key of the relayer account on this network
    /// the format is more dynamic here:
    /// 1. if it starts with '0x' then this would be raw (64 bytes) hex encoded
    ///    private key.
    ///    Example: 0x8917174396171783496173419137618235192359106130478137647163400318
    ///
    /// 2. if it starts with '$' then it would be considered as an Enviroment variable
    ///    of a hex-encoded private key.
    ///   Example: $ORACLE_PRIVATE_KEY
    ///
    /// 3. anything else is a path to a file holding the hex-encoded private key.
    ///   Example: ./oracle/oracle_private_key
    #[serde(skip_serializing)]
    pub private_key: Option<PrivateKey>,
    /// Where to find the oracle contract.
    #[serde(default = "ContractConfig::oracle_default")]
    pub oracle: ContractConfig,
    /// Where to find the caller contract, only used by the caller client.
    #[serde(default)]
    pub caller: Option<ContractConfig>,
    /// The gas ceiling for every write transaction.
    #[serde(default = "defaults::gas_limit")]
    pub gas_limit: u64,
    /// How often contract logs are polled, in milliseconds.
    #[serde(default = "defaults::polling_interval")]
    pub polling_interval: u64,
}

impl EvmChainConfig {
    /// How often contract logs are polled.
    pub fn polling_interval(&self) -> Duration {
        Duration::from_millis(self.polling_interval)
    }
}

/// ContractConfig tells the relayer where a contract is deployed.
///
/// An explicit `address` wins over the `artifact`; when only the artifact is set,
/// the address is looked up in its `networks` map by the network id.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ContractConfig {
    /// The address of this contract on this chain.
    #[serde(default)]
    pub address: Option<Address>,
    /// A Truffle build artifact of this contract.
    #[serde(default)]
    pub artifact: Option<PathBuf>,
}

impl ContractConfig {
    /// A contract config pointing at the default oracle artifact.
    pub fn oracle_default() -> Self {
        Self {
            address: None,
            artifact: Some(defaults::oracle_artifact()),
        }
    }

    /// Returns `true` if there is no way to locate the contract.
    pub fn is_unset(&self) -> bool {
        self.address.is_none() && self.artifact.is_none()
    }
}
