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
use oracle_relayer_contract::CallerContractEvents;

/// Logs what the caller contract reports back.
#[derive(Copy, Clone, Debug, Default)]
pub struct CallerEventsLogger;

#[async_trait::async_trait]
impl EventHandler for CallerEventsLogger {
    type Events = CallerContractEvents;

    fn can_handle_event(&self, _event: &Self::Events) -> bool {
        true
    }

    async fn handle_event(
        &self,
        event: Self::Events,
    ) -> oracle_relayer_utils::Result<()> {
        use CallerContractEvents::*;
        match event {
            PriceUpdatedEventFilter(data) => tracing::info!(
                id = %data.id,
                "* New PriceUpdated event. ethPrice: {}",
                data.eth_price,
            ),
            ReceivedNewRequestIdEventFilter(data) => {
                tracing::info!(id = %data.id, "Price requested")
            }
            NewOracleAddressEventFilter(data) => tracing::info!(
                oracle = ?data.oracle_address,
                "Oracle instance address set",
            ),
        }
        Ok(())
    }
}
