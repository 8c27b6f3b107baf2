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

use std::fmt::Debug;
use std::time::Duration;

use futures::prelude::*;
use oracle_relayer_utils::probe;

use crate::EventSource;

/// A helper type to extract the [`EventHandler`] from the [`EventWatcher`] trait.
pub type EventHandlerFor<W> =
    Box<dyn EventHandler<Events = <W as EventWatcher>::Events> + Send + Sync>;

/// A trait that defines a handler for a specific set of event types.
///
/// The handlers are implemented separately from the watchers, so that we can have
/// one event watcher and many event handlers.
#[async_trait::async_trait]
pub trait EventHandler {
    /// The type of event this handler is for.
    type Events: Send + Sync;

    /// Whether the event could be handled by the handler.
    fn can_handle_event(&self, event: &Self::Events) -> bool;

    /// A method to be called with the event information,
    /// it is up to the handler to decide what to do with the event.
    ///
    /// Handlers run on the watcher task, they must return quickly and never wait on
    /// anything slow.
    async fn handle_event(
        &self,
        event: Self::Events,
    ) -> oracle_relayer_utils::Result<()>;
}

/// A trait for watching events from an [`EventSource`].
#[async_trait::async_trait]
pub trait EventWatcher {
    /// A Helper tag used to identify the event watcher during the logs.
    const TAG: &'static str;
    /// The Events that this event watcher is interested in.
    type Events: Clone + Debug + Send + Sync;

    /// How long to wait before subscribing again.
    fn resubscribe_interval(&self) -> Duration {
        Duration::from_secs(1)
    }

    /// Returns a task that should be running in the background
    /// that will watch events.
    ///
    /// The task never completes on its own.
    #[tracing::instrument(skip_all, fields(tag = %Self::TAG))]
    async fn run<S>(
        &self,
        source: &S,
        handlers: Vec<EventHandlerFor<Self>>,
    ) -> oracle_relayer_utils::Result<()>
    where
        Self: Sync,
        S: EventSource<Events = Self::Events>,
    {
        let backoff =
            backoff::backoff::Constant::new(self.resubscribe_interval());
        let task = || async {
            let mut events = source.subscribe().await.map_err(|e| {
                tracing::warn!(error = %e, "Failed to subscribe, retrying ...");
                backoff::Error::transient(e)
            })?;
            tracing::event!(
                target: probe::TARGET,
                tracing::Level::DEBUG,
                kind = %probe::Kind::Listener,
                tag = %Self::TAG,
                subscribed = true,
            );
            while let Some(maybe_event) = events.next().await {
                let event = match maybe_event {
                    Ok(event) => event,
                    Err(e) => {
                        tracing::error!(error = %e, "Error on event");
                        continue;
                    }
                };
                tracing::trace!(?event, "Found event");
                let tasks = handlers
                    .iter()
                    .filter(|handler| handler.can_handle_event(&event))
                    .map(|handler| handler.handle_event(event.clone()));
                let results = futures::future::join_all(tasks).await;
                results.iter().for_each(|r| {
                    if let Err(e) = r {
                        tracing::error!(error = %e, "Error while handling the event");
                    }
                });
            }
            tracing::warn!("Event subscription closed, resubscribing ...");
            tracing::event!(
                target: probe::TARGET,
                tracing::Level::DEBUG,
                kind = %probe::Kind::Listener,
                tag = %Self::TAG,
                resubscribing = true,
            );
            Err::<(), _>(backoff::Error::transient(
                oracle_relayer_utils::Error::SubscriptionError {
                    reason: "event stream ended".into(),
                },
            ))
        };
        backoff::future::retry(backoff, task).await?;
        Ok(())
    }
}
