//! Shared test harness: an in-memory page bus wired to a scripted background.

use funwallet_bridge::{
    BackgroundPush, BackgroundTransport, ContentBridge, RelayedRequest, TransportError,
};
use funwallet_rpc::{BridgeEvent, BridgeRequest, BridgeResponse, InMemoryBus, PageBus, ResponseResult};
use futures::{
    StreamExt,
    channel::mpsc::{UnboundedReceiver, UnboundedSender, unbounded},
};
use parking_lot::Mutex;
use serde_json::Value;
use std::{collections::HashMap, sync::Arc, time::Duration};

pub const ORIGIN: &str = "https://dapp.example";

/// What the mock background replies to a given method.
#[derive(Clone)]
pub enum MockReply {
    Respond(ResponseResult),
    Fail(String),
    /// Never replies, the request stays in flight.
    Hang,
}

#[derive(Default)]
struct MockInner {
    replies: Mutex<HashMap<String, MockReply>>,
    push_subscribers: Mutex<Vec<UnboundedSender<BackgroundPush>>>,
    seen: Mutex<Vec<RelayedRequest>>,
}

/// A scripted [`BackgroundTransport`]: replies per method, records every
/// relayed request and lets the test inject pushes.
#[derive(Clone, Default)]
pub struct MockBackground {
    inner: Arc<MockInner>,
}

impl MockBackground {
    pub fn respond_to(&self, method: &str, reply: MockReply) {
        self.inner.replies.lock().insert(method.to_string(), reply);
    }

    pub fn push(&self, push: BackgroundPush) {
        for tx in self.inner.push_subscribers.lock().iter() {
            let _ = tx.unbounded_send(push.clone());
        }
    }

    pub fn seen(&self) -> Vec<RelayedRequest> {
        self.inner.seen.lock().clone()
    }
}

#[async_trait::async_trait]
impl BackgroundTransport for MockBackground {
    async fn request(&self, request: RelayedRequest) -> Result<ResponseResult, TransportError> {
        self.inner.seen.lock().push(request.clone());
        let reply = self.inner.replies.lock().get(&request.method).cloned();
        match reply {
            Some(MockReply::Respond(result)) => Ok(result),
            Some(MockReply::Fail(message)) => Err(TransportError::Message(message)),
            Some(MockReply::Hang) => futures::future::pending().await,
            None => Err(TransportError::Unavailable),
        }
    }

    fn pushes(&self) -> UnboundedReceiver<BackgroundPush> {
        let (tx, rx) = unbounded();
        self.inner.push_subscribers.lock().push(tx);
        rx
    }
}

pub struct Harness {
    pub bus: Arc<InMemoryBus>,
    pub background: MockBackground,
    pub bridge: Arc<ContentBridge<MockBackground>>,
    /// Everything posted on the bus, including our own requests; filter by
    /// direction via the helpers below.
    pub page: UnboundedReceiver<Value>,
}

/// Spawns a bridge over a fresh bus and mock background.
pub fn harness() -> Harness {
    let bus = InMemoryBus::new();
    let background = MockBackground::default();
    let bridge =
        ContentBridge::new(Arc::clone(&bus) as Arc<dyn PageBus>, background.clone(), ORIGIN);
    let page = bus.subscribe();
    let _task = Arc::clone(&bridge).spawn();
    Harness { bus, background, bridge, page }
}

impl Harness {
    /// Posts a page request onto the bus, as the inpage provider would.
    pub fn send(&self, id: &str, method: &str, params: Value) {
        self.bus.post(BridgeRequest::new(id, method, params).to_value());
    }

    /// Awaits the next page-bound terminal response.
    pub async fn next_response(&mut self) -> BridgeResponse {
        loop {
            let msg = self.page.next().await.expect("bus closed while awaiting response");
            if let Some(resp) = BridgeResponse::from_page_message(&msg) {
                return resp;
            }
        }
    }

    /// Awaits the next page-bound wallet event.
    pub async fn next_event(&mut self) -> BridgeEvent {
        loop {
            let msg = self.page.next().await.expect("bus closed while awaiting event");
            if let Some(event) = BridgeEvent::from_page_message(&msg) {
                return event;
            }
        }
    }

    /// Asserts that no page-bound message arrives within the grace window.
    pub async fn expect_silence(&mut self) {
        let window = async {
            loop {
                let msg = self.page.next().await.expect("bus closed");
                if let Some(resp) = BridgeResponse::from_page_message(&msg) {
                    panic!("unexpected response: {resp:?}");
                }
                if let Some(event) = BridgeEvent::from_page_message(&msg) {
                    panic!("unexpected event: {event:?}");
                }
            }
        };
        let _ = tokio::time::timeout(Duration::from_millis(50), window).await;
    }
}
