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

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use futures::prelude::*;
use oracle_relayer_utils::Error;
use parking_lot::Mutex;
use tracing::Instrument;
use tracing_test::traced_test;

use crate::{EventHandler, EventSource, EventStream, EventWatcher};

#[derive(Debug, Clone, PartialEq, Eq)]
enum TestEvent {
    Request(u64),
    Noise,
}

type Subscription = Result<Vec<oracle_relayer_utils::Result<TestEvent>>, Error>;

/// Plays back one scripted subscription per `subscribe` call, then stays silent.
#[derive(Default)]
struct ScriptedSource {
    subscriptions: Mutex<VecDeque<Subscription>>,
    subscribed: Mutex<usize>,
}

impl ScriptedSource {
    fn new(subscriptions: Vec<Subscription>) -> Self {
        Self {
            subscriptions: Mutex::new(subscriptions.into()),
            subscribed: Mutex::new(0),
        }
    }
}

#[async_trait::async_trait]
impl EventSource for ScriptedSource {
    type Events = TestEvent;

    async fn subscribe(
        &self,
    ) -> oracle_relayer_utils::Result<EventStream<'_, TestEvent>> {
        *self.subscribed.lock() += 1;
        let next = self.subscriptions.lock().pop_front();
        match next {
            Some(Ok(events)) => Ok(stream::iter(events).boxed()),
            Some(Err(e)) => Err(e),
            None => Ok(stream::pending().boxed()),
        }
    }
}

#[derive(Default, Clone)]
struct RequestRecorder {
    seen: Arc<Mutex<Vec<u64>>>,
}

#[async_trait::async_trait]
impl EventHandler for RequestRecorder {
    type Events = TestEvent;

    fn can_handle_event(&self, event: &TestEvent) -> bool {
        matches!(event, TestEvent::Request(_))
    }

    async fn handle_event(&self, event: TestEvent) -> oracle_relayer_utils::Result<()> {
        if let TestEvent::Request(id) = event {
            self.seen.lock().push(id);
        }
        Ok(())
    }
}

struct AlwaysFails;

#[async_trait::async_trait]
impl EventHandler for AlwaysFails {
    type Events = TestEvent;

    fn can_handle_event(&self, _event: &TestEvent) -> bool {
        true
    }

    async fn handle_event(&self, _event: TestEvent) -> oracle_relayer_utils::Result<()> {
        Err(Error::Generic("handler failed"))
    }
}

struct TestEventsWatcher;

impl EventWatcher for TestEventsWatcher {
    const TAG: &'static str = "Test Event Watcher";
    type Events = TestEvent;
}

fn transport_hiccup() -> oracle_relayer_utils::Result<TestEvent> {
    Err(Error::SubscriptionError {
        reason: "malformed log".into(),
    })
}

async fn run_for(source: Arc<ScriptedSource>, recorder: RequestRecorder, secs: u64) {
    let watcher = tokio::spawn(async move {
        TestEventsWatcher
            .run(
                source.as_ref(),
                vec![Box::new(recorder), Box::new(AlwaysFails)],
            )
            .await
    }
    .in_current_span());
    tokio::time::sleep(Duration::from_secs(secs)).await;
    assert!(!watcher.is_finished(), "the watcher must never stop");
    watcher.abort();
}

#[tokio::test(start_paused = true)]
#[traced_test]
async fn malformed_events_do_not_end_the_subscription() {
    let source = Arc::new(ScriptedSource::new(vec![Ok(vec![
        Ok(TestEvent::Request(1)),
        transport_hiccup(),
        Ok(TestEvent::Noise),
        Ok(TestEvent::Request(2)),
    ])]));
    let recorder = RequestRecorder::default();
    run_for(source.clone(), recorder.clone(), 1).await;
    assert_eq!(*recorder.seen.lock(), vec![1, 2]);
    assert!(logs_contain("Error on event"));
    assert!(logs_contain("Error while handling the event"));
}

#[tokio::test(start_paused = true)]
async fn resubscribes_after_the_stream_ends_or_subscribing_fails() {
    let source = Arc::new(ScriptedSource::new(vec![
        Ok(vec![Ok(TestEvent::Request(1))]),
        Err(Error::SubscriptionError {
            reason: "connection refused".into(),
        }),
        Ok(vec![Ok(TestEvent::Request(2)), Ok(TestEvent::Request(3))]),
    ]));
    let recorder = RequestRecorder::default();
    run_for(source.clone(), recorder.clone(), 10).await;
    assert_eq!(*recorder.seen.lock(), vec![1, 2, 3]);
    // three scripted subscriptions, then a silent one that stays open.
    assert_eq!(*source.subscribed.lock(), 4);
}
