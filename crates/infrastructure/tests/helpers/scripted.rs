#![allow(dead_code)]
use super::ResponseBuilder;
use async_trait::async_trait;
use ferrous_q_domain::{DomainError, Net};
use ferrous_q_infrastructure::dns::exchange::{Exchanged, Exchanger};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

type Responder = Box<dyn Fn(&[u8]) -> Vec<u8> + Send + Sync>;

/// What the scripted server does with the next request.
pub enum Reply {
    Answer,
    Truncated,
    WrongId,
    Fail(DomainError),
    With(Responder),
}

impl Reply {
    pub fn with<F>(f: F) -> Self
    where
        F: Fn(&[u8]) -> Vec<u8> + Send + Sync + 'static,
    {
        Reply::With(Box::new(f))
    }
}

/// In-memory exchanger that plays back a script and records every request.
pub struct ScriptedExchanger {
    script: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<(Vec<u8>, Net)>>,
}

impl ScriptedExchanger {
    pub fn new(script: Vec<Reply>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn requests(&self) -> Vec<(Vec<u8>, Net)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Exchanger for ScriptedExchanger {
    async fn exchange(&self, request: &[u8], net: Net) -> Result<Exchanged, DomainError> {
        self.requests.lock().unwrap().push((request.to_vec(), net));
        let reply = self.script.lock().unwrap().pop_front().unwrap_or(Reply::Answer);

        let bytes = match reply {
            Reply::Answer => ResponseBuilder::reply_to(request)
                .a("example.com.", [192, 0, 2, 1])
                .build(),
            Reply::Truncated => ResponseBuilder::reply_to(request).truncated().build(),
            Reply::WrongId => {
                let id = u16::from_be_bytes([request[0], request[1]]);
                ResponseBuilder::reply_to(request)
                    .with_id(id.wrapping_add(1))
                    .build()
            }
            Reply::Fail(e) => return Err(e),
            Reply::With(f) => f(request),
        };

        Ok(Exchanged {
            bytes,
            rtt: Duration::from_micros(250),
        })
    }
}
