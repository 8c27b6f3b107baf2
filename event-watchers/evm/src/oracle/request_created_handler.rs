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

use oracle_event_watcher_traits::EventHandler;
use oracle_relayer_contract::EthPriceOracleEvents;
use oracle_relayer_store::{PendingRequest, RequestQueue};
use oracle_relayer_utils::probe;

/// Queues a [`PendingRequest`] for every `GetLatestEthPriceEvent`.
#[derive(Clone, Debug)]
pub struct RequestCreatedHandler {
    queue: RequestQueue,
}

impl RequestCreatedHandler {
    /// Creates a handler feeding `queue`.
    pub fn new(queue: RequestQueue) -> Self {
        Self { queue }
    }
}

#[async_trait::async_trait]
impl EventHandler for RequestCreatedHandler {
    type Events = EthPriceOracleEvents;

    fn can_handle_event(&self, event: &Self::Events) -> bool {
        matches!(event, EthPriceOracleEvents::GetLatestEthPriceEventFilter(_))
    }

    #[tracing::instrument(skip_all)]
    async fn handle_event(
        &self,
        event: Self::Events,
    ) -> oracle_relayer_utils::Result<()> {
        let EthPriceOracleEvents::GetLatestEthPriceEventFilter(data) = event else {
            return Ok(());
        };
        let request = PendingRequest::new(data.id, data.caller_address);
        tracing::info!(%request, "New price request");
        self.queue.enqueue(request);
        tracing::event!(
            target: probe::TARGET,
            tracing::Level::DEBUG,
            kind = %probe::Kind::Queue,
            enqueued = %request.id,
            caller = ?request.caller_address,
            len = self.queue.len(),
        );
        Ok(())
    }
}
