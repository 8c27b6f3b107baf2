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
//! # Oracle Relayer Contract 🕸️
//!
//! Typed bindings for the `EthPriceOracle` and `CallerContract` contracts, the lookup of
//! their deployed addresses, and the [`ContractGateway`] seam through which the relayer
//! writes back to the chain.

/// Truffle build artifacts.
pub mod artifact;
/// Writing to the oracle contract.
pub mod gateway;
/// A recording gateway, for tests.
pub mod mocked;

pub use artifact::{resolve_contract_instance, DeploymentArtifact};
pub use bindings::*;
pub use gateway::{ContractGateway, EthersContractGateway, OracleCall};

#[allow(missing_docs, clippy::too_many_arguments)]
mod bindings {
    use ethers::prelude::abigen;

    abigen!(
        EthPriceOracle,
        r#"[
            function setLatestEthPrice(uint256 _ethPrice, address _callerAddress, uint256 _id)
            function addOracle(address _oracle)
            function removeOracle(address _oracle)
            function setThreshold(uint256 _threshold)
            event GetLatestEthPriceEvent(address callerAddress, uint256 id)
            event SetLatestEthPriceEvent(uint256 ethPrice, address callerAddress)
            event AddOracleEvent(address oracleAddress)
            event RemoveOracleEvent(address oracleAddress)
            event SetThresholdEvent(uint256 threshold)
        ]"#,
    );

    abigen!(
        CallerContract,
        r#"[
            function setOracleInstanceAddress(address _oracleInstanceAddress)
            function updateEthPrice()
            event newOracleAddressEvent(address oracleAddress)
            event ReceivedNewRequestIdEvent(uint256 id)
            event PriceUpdatedEvent(uint256 ethPrice, uint256 id)
        ]"#,
    );
}
