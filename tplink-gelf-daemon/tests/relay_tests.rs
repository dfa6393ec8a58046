//! Relay assembly and end-to-end forwarding tests.

use std::io::{Read, Write};
use std::time::Duration;

use flate2::read::ZlibDecoder;
use serde_json::Value;
use tokio::net::UdpSocket;

use tplink_gelf_core::config::RelayConfig;
use tplink_gelf_daemon::relay::Relay;

const DHCP: &str = "<134>1 2025-07-19 19:21:46 Omada-Controller-XXXX-YYYYYYYYYY - - - 2.5G WAN1: DHCP client lease expired. Began renewing the lease.";

fn config_for(graylog_port: u16) -> RelayConfig {
    let mut config = RelayConfig::default();
    config.listener.bind = "127.0.0.1:0".to_owned();
    config.output.host = "127.0.0.1".to_owned();
    config.output.port = graylog_port;
    config
}

#[tokio::test]
async fn test_relay_forwards_and_stops_on_cancel() {
    // Given: a fake Graylog input and a relay pointing at it
    let graylog = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let relay = Relay::build_from_config(config_for(graylog.local_addr().unwrap().port()))
        .await
        .expect("relay should build");
    let listen = relay.local_addr().unwrap();
    let shutdown = relay.shutdown_token();
    let handle = tokio::spawn(relay.run());

    // When: a controller sends a syslog datagram
    let device = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    device.send_to(DHCP.as_bytes(), listen).await.unwrap();

    // Then: one compressed GELF record arrives
    let mut buf = vec![0u8; 65_535];
    let n = tokio::time::timeout(Duration::from_secs(5), graylog.recv(&mut buf))
        .await
        .expect("timed out waiting for GELF record")
        .unwrap();
    let mut json = Vec::new();
    ZlibDecoder::new(&buf[..n]).read_to_end(&mut json).unwrap();
    let record: Value = serde_json::from_slice(&json).unwrap();
    assert_eq!(record["_tp_link"], "DHCP");
    assert_eq!(record["full_message"], DHCP);

    shutdown.cancel();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("relay did not stop")
        .unwrap()
        .expect("relay should stop cleanly");
}

#[tokio::test]
async fn test_relay_rejects_invalid_config() {
    let mut config = config_for(12201);
    config.output.default_level = 9;
    let result = Relay::build_from_config(config).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_relay_fails_when_listener_cannot_bind() {
    // Given: the listen port is already taken
    let taken = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
    let mut config = config_for(12201);
    config.listener.bind = taken.local_addr().unwrap().to_string();

    // Then: startup fails
    let err = Relay::build_from_config(config).await.err().unwrap();
    assert!(err.to_string().contains("syslog listener"));
}

#[tokio::test]
async fn test_relay_builds_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        "[listener]\nbind = \"127.0.0.1:0\"\n\n[output]\nhost = \"127.0.0.1\"\ncompress = false\n"
    )
    .unwrap();

    let relay = Relay::build(file.path()).await.expect("relay should build");
    assert!(relay.local_addr().unwrap().ip().is_loopback());
}
