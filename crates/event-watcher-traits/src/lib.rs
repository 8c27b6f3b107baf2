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
//! # Oracle Events Watcher Traits 🕸️
//!
//! A module that listens for events emitted by the oracle contract.
//!
//! ## Overview
//!
//! An [`EventSource`] hands out a stream of decoded events. The [`EventWatcher`] subscribes
//! to it and dispatches every event to the [`EventHandler`]s interested in it. Errors on
//! the stream are logged and skipped, and when the stream ends or subscribing fails the
//! watcher subscribes again, so a watcher stays subscribed for the lifetime of the
//! process.

use futures::stream::BoxStream;

/// Event watching traits
mod event_watcher;
pub use event_watcher::*;

#[cfg(test)]
mod tests;

/// A stream of decoded events, an `Err` item is a hiccup of the transport and does not end
/// the stream.
pub type EventStream<'a, E> = BoxStream<'a, oracle_relayer_utils::Result<E>>;

/// Something that can be subscribed to for events.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    /// The events delivered by this source.
    type Events: Send;

    /// Opens a new subscription.
    async fn subscribe(
        &self,
    ) -> oracle_relayer_utils::Result<EventStream<'_, Self::Events>>;
}
