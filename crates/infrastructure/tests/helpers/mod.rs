#![allow(dead_code)]
#![allow(unused_imports)]
mod builders;
mod dns_server_mock;
mod scripted;

pub use builders::ResponseBuilder;
pub use dns_server_mock::{MockTcpServer, MockUdpServer};
pub use scripted::{Reply, ScriptedExchanger};
