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

use derive_more::Display;
/// Target for logger
pub const TARGET: &str = "oracle_probe";

/// The Kind of the Probe.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// When the Lifecycle of the Relayer changes, like starting or shutting down.
    #[display(fmt = "lifecycle")]
    Lifecycle,
    /// The oracle event listener (subscribed, resubscribing, event seen).
    #[display(fmt = "listener")]
    Listener,
    /// Request queue state changes (enqueue and drain).
    #[display(fmt = "queue")]
    Queue,
    /// One batch processing cycle.
    #[display(fmt = "cycle")]
    Cycle,
    /// When the relayer will retry to do something.
    #[display(fmt = "retry")]
    Retry,
    /// A zero-price fallback was written for a request.
    #[display(fmt = "fallback")]
    Fallback,
    /// One-time oracle setup calls.
    #[display(fmt = "setup")]
    Setup,
}
