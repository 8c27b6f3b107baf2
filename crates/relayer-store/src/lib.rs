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
//! # Oracle Relayer Store 🕸️
//!
//! The relayer keeps no durable state. The only thing it stores is the queue of price
//! requests seen on-chain and not yet answered, which lives in memory and is lost on restart.

use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

/// In-memory request queue.
pub mod mem;

pub use mem::RequestQueue;

/// One outstanding price lookup triggered on-chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PendingRequest {
    /// The request id assigned by the oracle contract.
    pub id: U256,
    /// The contract that asked for the price, and receives it.
    pub caller_address: Address,
}

impl PendingRequest {
    /// Creates a new pending request.
    pub fn new(id: impl Into<U256>, caller_address: Address) -> Self {
        Self {
            id: id.into(),
            caller_address,
        }
    }
}

impl std::fmt::Display for PendingRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} from {:?}", self.id, self.caller_address)
    }
}
