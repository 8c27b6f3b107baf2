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

//! Watches the `EthPriceOracle` and `CallerContract` contracts and turns their events into
//! queued price requests and log lines.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use ethers::abi::RawLog;
use ethers::contract::EthLogDecode;
use ethers::providers::Middleware;
use ethers::types::{Address, Filter, Log, U64};
use futures::prelude::*;
use oracle_event_watcher_traits::{EventSource, EventStream, EventWatcher};
use oracle_relayer_contract::{CallerContractEvents, EthPriceOracleEvents};
use oracle_relayer_utils::Error;
use parking_lot::Mutex;

/// A module for handling caller contract events.
pub mod caller;
/// A module for handling oracle contract events.
pub mod oracle;

pub use caller::CallerEventsLogger;
pub use oracle::{OracleEventsLogger, RequestCreatedHandler};


/// The widest block range asked for in one `eth_getLogs` call.
pub const MAX_BLOCK_RANGE: u64 = 1_000;

/// ContractWrapper polls the logs of one contract and decodes them into `E`.
///
/// Logs are queried over block ranges with `eth_getLogs`. The next block to
/// query is kept across subscriptions, so a resubscribe resumes where the
/// previous stream stopped.
#[derive(Debug)]
pub struct ContractWrapper<M, E> {
    client: Arc<M>,
    address: Address,
    polling_interval: Duration,
    next_block: Arc<Mutex<Option<U64>>>,
    _events: PhantomData<fn() -> E>,
}

/// Watches the `EthPriceOracle` contract.
pub type OracleContractWrapper<M> = ContractWrapper<M, EthPriceOracleEvents>;
/// Watches the `CallerContract` contract.
pub type CallerContractWrapper<M> = ContractWrapper<M, CallerContractEvents>;

impl<M, E> ContractWrapper<M, E>
where
    M: Middleware,
{
    /// Creates a new ContractWrapper, polling for new blocks every `polling_interval`.
    pub fn new(
        address: Address,
        client: Arc<M>,
        polling_interval: Duration,
    ) -> Self {
        Self {
            client,
            address,
            polling_interval,
            next_block: Default::default(),
            _events: PhantomData,
        }
    }

    /// The address of the watched contract.
    pub fn address(&self) -> Address {
        self.address
    }

    /// The first block the next poll will query, if polling has started.
    pub fn next_block(&self) -> Option<U64> {
        *self.next_block.lock()
    }
}

fn subscription_error(e: impl ToString) -> Error {
    Error::SubscriptionError {
        reason: e.to_string(),
    }
}

struct PollState<M> {
    client: Arc<M>,
    address: Address,
    polling_interval: Duration,
    next_block: Arc<Mutex<Option<U64>>>,
    closed: bool,
}

impl<M: Middleware> PollState<M> {
    /// Waits for at least one new block, then returns the logs of the next range.
    async fn poll(&self) -> oracle_relayer_utils::Result<Vec<Log>> {
        loop {
            let latest = self
                .client
                .get_block_number()
                .await
                .map_err(subscription_error)?;
            let from = (*self.next_block.lock()).unwrap_or(latest);
            if latest < from {
                tokio::time::sleep(self.polling_interval).await;
                continue;
            }
            let to = latest.min(from + U64::from(MAX_BLOCK_RANGE - 1));
            let filter = Filter::new()
                .address(self.address)
                .from_block(from)
                .to_block(to);
            let logs = self
                .client
                .get_logs(&filter)
                .await
                .map_err(subscription_error)?;
            tracing::trace!(%from, %to, found = logs.len(), "Polled contract logs");
            *self.next_block.lock() = Some(to + U64::one());
            return Ok(logs);
        }
    }
}

#[async_trait::async_trait]
impl<M, E> EventSource for ContractWrapper<M, E>
where
    M: Middleware + 'static,
    E: EthLogDecode + Send + 'static,
{
    type Events = E;

    async fn subscribe(
        &self,
    ) -> oracle_relayer_utils::Result<EventStream<'_, Self::Events>> {
        if self.next_block().is_none() {
            let latest = self
                .client
                .get_block_number()
                .await
                .map_err(subscription_error)?;
            *self.next_block.lock() = Some(latest + U64::one());
        }
        tracing::debug!(
            address = ?self.address,
            polling_interval = ?self.polling_interval,
            next_block = ?self.next_block(),
            "Watching contract logs",
        );
        let state = PollState {
            client: self.client.clone(),
            address: self.address,
            polling_interval: self.polling_interval,
            next_block: self.next_block.clone(),
            closed: false,
        };
        // A failed poll yields its error once and then ends the stream.
        let events = stream::unfold(state, |mut state| async move {
            if state.closed {
                return None;
            }
            let batch: Vec<oracle_relayer_utils::Result<E>> = match state.poll().await {
                Ok(logs) => logs.into_iter().map(decode_log::<E>).collect(),
                Err(e) => {
                    state.closed = true;
                    vec![Err(e)]
                }
            };
            Some((stream::iter(batch), state))
        })
        .flatten()
        .boxed();
        Ok(events)
    }
}

/// Decodes one log into one of the events `E`.
///
/// Logs that match none of them end up as a [`Error::SubscriptionError`].
pub fn decode_log<E>(log: Log) -> oracle_relayer_utils::Result<E>
where
    E: EthLogDecode,
{
    let raw = RawLog {
        topics: log.topics,
        data: log.data.to_vec(),
    };
    E::decode_log(&raw).map_err(|e| Error::SubscriptionError {
        reason: format!("failed to decode log: {e}"),
    })
}

/// An Oracle Contract Watcher that watches for the `EthPriceOracle` contract events.
#[derive(Copy, Clone, Debug, Default)]
pub struct OracleContractWatcher;

impl EventWatcher for OracleContractWatcher {
    const TAG: &'static str = "Oracle Contract Watcher";

    type Events = EthPriceOracleEvents;
}

/// A Caller Contract Watcher that watches for the `CallerContract` contract events.
#[derive(Copy, Clone, Debug, Default)]
pub struct CallerContractWatcher;

impl EventWatcher for CallerContractWatcher {
    const TAG: &'static str = "Caller Contract Watcher";

    type Events = CallerContractEvents;
}
