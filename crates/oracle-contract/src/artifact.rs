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

use std::collections::HashMap;
use std::path::Path;

use ethers::types::Address;
use oracle_relayer_utils::Error;
use serde::Deserialize;

/// The part of a Truffle build artifact (`build/contracts/<Name>.json`) the relayer cares
/// about: the contract name and where it got deployed, keyed by network id.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentArtifact {
    /// The contract name.
    #[serde(default)]
    pub contract_name: String,
    /// Deployments, keyed by the network id as returned by `net_version`.
    #[serde(default)]
    pub networks: HashMap<String, NetworkDeployment>,
}

/// One deployment of a contract.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct NetworkDeployment {
    /// The address the contract lives at.
    pub address: Address,
}

impl DeploymentArtifact {
    /// Reads and parses an artifact file.
    pub fn from_file(path: impl AsRef<Path>) -> oracle_relayer_utils::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let artifact = serde_json::from_str(&contents)?;
        Ok(artifact)
    }

    /// The address of the contract on the given network.
    pub fn address_on(&self, network_id: &str) -> Option<Address> {
        self.networks.get(network_id).map(|d| d.address)
    }
}

/// Finds the address of a contract on the network identified by `network_id`.
///
/// An explicitly configured `address` always wins, otherwise the Truffle `artifact` is read
/// and its `networks` map consulted.
pub fn resolve_contract_instance(
    address: Option<Address>,
    artifact: Option<&Path>,
    network_id: &str,
) -> oracle_relayer_utils::Result<Address> {
    if let Some(address) = address {
        return Ok(address);
    }
    let path = artifact.ok_or_else(|| {
        Error::InvalidConfig(
            "contract needs either an address or an artifact".into(),
        )
    })?;
    let artifact = DeploymentArtifact::from_file(path)?;
    let contract = if artifact.contract_name.is_empty() {
        path.display().to_string()
    } else {
        artifact.contract_name.clone()
    };
    let address = artifact.address_on(network_id).ok_or_else(|| {
        Error::ContractNotDeployed {
            contract,
            network_id: network_id.to_owned(),
        }
    })?;
    tracing::debug!(%network_id, ?address, "resolved contract from artifact");
    Ok(address)
}
