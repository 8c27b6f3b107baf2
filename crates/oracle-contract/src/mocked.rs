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

use ethers::types::{Address, H256};
use oracle_relayer_utils::{Error, Result};
use parking_lot::Mutex;

use crate::{ContractGateway, OracleCall};

#[derive(Debug, Default)]
struct Recorded {
    attempts: Vec<(OracleCall, Address)>,
    accepted: Vec<(OracleCall, Address)>,
    failures: HashMap<&'static str, usize>,
}

/// A [`ContractGateway`] that accepts every write and remembers it, without touching any
/// chain.
///
/// Writes to a method can be made to fail a number of times with
/// [`RecordingGateway::fail_next`].
#[derive(Debug, Default)]
pub struct RecordingGateway {
    accounts: Vec<Address>,
    recorded: Mutex<Recorded>,
}

impl RecordingGateway {
    /// Creates a gateway that signs for `accounts`.
    pub fn new(accounts: Vec<Address>) -> Self {
        Self {
            accounts,
            recorded: Mutex::default(),
        }
    }

    /// The next `times` writes to `method` fail with [`Error::TransactionFailed`].
    pub fn fail_next(&self, method: &'static str, times: usize) {
        *self.recorded.lock().failures.entry(method).or_default() += times;
    }

    /// Every write that went through, in order.
    pub fn accepted(&self) -> Vec<(OracleCall, Address)> {
        self.recorded.lock().accepted.clone()
    }

    /// Every write that was attempted, including the failed ones.
    pub fn attempts(&self) -> Vec<(OracleCall, Address)> {
        self.recorded.lock().attempts.clone()
    }
}

#[async_trait::async_trait]
impl ContractGateway for RecordingGateway {
    async fn send_write(&self, call: OracleCall, from: Address) -> Result<H256> {
        let mut recorded = self.recorded.lock();
        recorded.attempts.push((call, from));
        if let Some(left) = recorded.failures.get_mut(call.method()) {
            if *left > 0 {
                *left -= 1;
                return Err(Error::transaction_failed(
                    call.method(),
                    "execution reverted",
                ));
            }
        }
        recorded.accepted.push((call, from));
        Ok(H256::from_low_u64_be(recorded.accepted.len() as u64))
    }

    async fn accounts(&self) -> Result<Vec<Address>> {
        Ok(self.accounts.clone())
    }
}
