use ferrous_q_domain::{DnsQuery, DomainError, Endpoint, Net, RecordType};
use ferrous_q_infrastructure::dns::transfer::{TransferClient, TransferEvent};
use ferrous_q_infrastructure::dns::tsig::TsigKeyring;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;

mod helpers;
use helpers::{MockTcpServer, MockUdpServer, ResponseBuilder};

fn client(addr: std::net::SocketAddr) -> TransferClient {
    TransferClient::new(
        Endpoint::parse(&addr.to_string(), 53),
        Some(Duration::from_secs(2)),
        Arc::new(TsigKeyring::new()),
    )
}

async fn collect(client: &TransferClient, query: DnsQuery, net: Net) -> Vec<TransferEvent> {
    client.stream(&query, net).collect().await
}

#[tokio::test]
async fn test_axfr_spanning_two_messages_completes() {
    let server = MockTcpServer::start(|query| {
        vec![
            ResponseBuilder::reply_to(query)
                .soa("example.com.", 2024)
                .a("example.com.", [192, 0, 2, 1])
                .build(),
            ResponseBuilder::reply_to(query)
                .a("www.example.com.", [192, 0, 2, 2])
                .soa("example.com.", 2024)
                .build(),
        ]
    })
    .await
    .unwrap();

    // Requested over UDP: AXFR still goes over TCP.
    let events = collect(
        &client(server.addr()),
        DnsQuery::new("example.com", RecordType::AXFR),
        Net::udp(),
    )
    .await;

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].as_ref().unwrap().len(), 2);
    assert_eq!(events[1].as_ref().unwrap().len(), 2);
}

#[tokio::test]
async fn test_axfr_cut_short_ends_with_error() {
    let server = MockTcpServer::start(|query| {
        vec![ResponseBuilder::reply_to(query)
            .soa("example.com.", 7)
            .a("example.com.", [192, 0, 2, 1])
            .build()]
    })
    .await
    .unwrap();

    let events = collect(
        &client(server.addr()),
        DnsQuery::new("example.com", RecordType::AXFR),
        Net::tcp(),
    )
    .await;

    assert_eq!(events.len(), 2);
    assert!(events[0].is_ok());
    assert!(matches!(events[1], Err(DomainError::TransferFailed(_))));
}

#[tokio::test]
async fn test_refused_transfer_is_a_single_error() {
    let server =
        MockTcpServer::start(|query| vec![ResponseBuilder::reply_to(query).rcode(5).build()])
            .await
            .unwrap();

    let events = collect(
        &client(server.addr()),
        DnsQuery::new("example.com", RecordType::AXFR),
        Net::tcp(),
    )
    .await;

    assert_eq!(events.len(), 1);
    match &events[0] {
        Err(DomainError::TransferFailed(msg)) => assert!(msg.contains("REFUSED")),
        other => panic!("unexpected event {:?}", other.as_ref().map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_axfr_not_starting_with_soa_is_an_error() {
    let server = MockTcpServer::start(|query| {
        vec![ResponseBuilder::reply_to(query)
            .a("example.com.", [192, 0, 2, 1])
            .build()]
    })
    .await
    .unwrap();

    let events = collect(
        &client(server.addr()),
        DnsQuery::new("example.com", RecordType::AXFR),
        Net::tcp(),
    )
    .await;

    assert_eq!(events.len(), 1);
    assert!(events[0].is_err());
}

#[tokio::test]
async fn test_wrong_id_is_an_error() {
    let server = MockTcpServer::start(|query| {
        let id = u16::from_be_bytes([query[0], query[1]]);
        vec![ResponseBuilder::reply_to(query)
            .with_id(id ^ 0xFFFF)
            .soa("example.com.", 1)
            .build()]
    })
    .await
    .unwrap();

    let events = collect(
        &client(server.addr()),
        DnsQuery::new("example.com", RecordType::AXFR),
        Net::tcp(),
    )
    .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(events[0], Err(DomainError::IdMismatch { .. })));
}

#[tokio::test]
async fn test_ixfr_up_to_date_over_tcp() {
    let server = MockTcpServer::start(|query| {
        vec![ResponseBuilder::reply_to(query)
            .soa("example.com.", 42)
            .build()]
    })
    .await
    .unwrap();

    let query = DnsQuery::new("example.com", RecordType::IXFR).with_ixfr_serial(Some(42));
    let events = collect(&client(server.addr()), query, Net::tcp()).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].as_ref().unwrap().len(), 1);
}

#[tokio::test]
async fn test_ixfr_incremental_over_tcp() {
    let server = MockTcpServer::start(|query| {
        vec![ResponseBuilder::reply_to(query)
            .soa("example.com.", 3)
            .soa("example.com.", 2)
            .a("old.example.com.", [192, 0, 2, 1])
            .soa("example.com.", 3)
            .a("new.example.com.", [192, 0, 2, 2])
            .soa("example.com.", 3)
            .build()]
    })
    .await
    .unwrap();

    let query = DnsQuery::new("example.com", RecordType::IXFR).with_ixfr_serial(Some(2));
    let events = collect(&client(server.addr()), query, Net::tcp()).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].as_ref().unwrap().len(), 6);
}

#[tokio::test]
async fn test_ixfr_over_udp_is_one_batch() {
    let server = MockUdpServer::start(|query| {
        ResponseBuilder::reply_to(query)
            .soa("example.com.", 9)
            .soa("example.com.", 8)
            .build()
    })
    .await
    .unwrap();

    let query = DnsQuery::new("example.com", RecordType::IXFR).with_ixfr_serial(Some(8));
    let events = collect(&client(server.addr()), query, Net::udp()).await;

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].as_ref().unwrap().len(), 2);
}
