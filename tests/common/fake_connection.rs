//! A scripted stand-in for the language server connection.
//!
//! Replies are queued per method and consumed in request order. A deferred
//! reply keeps its request outstanding until the test sends the response,
//! which lets tests choose the order responses arrive in.

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::sync::Mutex;

use lsp_types::notification::Notification;
use lsp_types::request::Request;
use rclang_client::error::LspError;
use rclang_client::lsp::{LspResult, RcConnection};
use serde_json::Value;
use tokio::sync::oneshot;

enum Reply {
    Ready(Result<Value, String>),
    Deferred(oneshot::Receiver<Value>),
}

#[derive(Default)]
pub struct FakeConnection {
    replies: Mutex<HashMap<String, VecDeque<Reply>>>,
    requests: Mutex<Vec<(String, Value)>>,
    notifications: Mutex<Vec<(String, Value)>>,
}

impl FakeConnection {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, method: &str, reply: Reply) {
        self.replies
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(reply);
    }

    /// Queues an immediate response.
    pub fn reply(&self, method: &str, value: Value) {
        self.push(method, Reply::Ready(Ok(value)));
    }

    /// Queues a transport failure.
    pub fn fail(&self, method: &str, message: &str) {
        self.push(method, Reply::Ready(Err(message.to_string())));
    }

    /// Queues a response the test releases later through the returned sender.
    pub fn defer(&self, method: &str) -> oneshot::Sender<Value> {
        let (tx, rx) = oneshot::channel();
        self.push(method, Reply::Deferred(rx));
        tx
    }

    /// Params of every request sent for `method`, in order.
    pub fn requests(&self, method: &str) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, params)| params.clone())
            .collect()
    }

    /// Every notification sent, in order.
    pub fn notifications(&self) -> Vec<(String, Value)> {
        self.notifications.lock().unwrap().clone()
    }
}

impl RcConnection for FakeConnection {
    fn request<R>(&self, params: R::Params) -> impl Future<Output = LspResult<R::Result>> + Send
    where
        R: Request,
    {
        let params = serde_json::to_value(params).unwrap();
        self.requests
            .lock()
            .unwrap()
            .push((R::METHOD.to_string(), params));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .get_mut(R::METHOD)
            .and_then(VecDeque::pop_front);

        async move {
            let value = match reply {
                None => {
                    return Err(LspError::RequestFailed(format!(
                        "no scripted reply for {}",
                        R::METHOD
                    )));
                }
                Some(Reply::Ready(result)) => result.map_err(LspError::RequestFailed)?,
                Some(Reply::Deferred(rx)) => rx
                    .await
                    .map_err(|_| LspError::RequestFailed("reply dropped".to_string()))?,
            };
            serde_json::from_value(value).map_err(|e| LspError::ParseError(e.to_string()))
        }
    }

    fn notify<N>(&self, params: N::Params) -> impl Future<Output = LspResult<()>> + Send
    where
        N: Notification,
    {
        let params = serde_json::to_value(params).unwrap();
        self.notifications
            .lock()
            .unwrap()
            .push((N::METHOD.to_string(), params));
        async { Ok(()) }
    }
}
