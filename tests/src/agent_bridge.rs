//! Agent bridge tests
//!
//! Exercise the agent client and the legacy ingress path against real
//! sockets:
//! - KPI publishing over one persistent connection
//! - Recommendation round trips, including "no action" replies
//! - Control commands pushed by the agent
//! - Config pushes written to the control files

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::{
    agent_settings, init_test_logging, wait_for_condition, MockAgent, DEFAULT_POLL_INTERVAL,
    DEFAULT_TEST_TIMEOUT, GNB_MEID,
};
use ricbridge_agent::{
    AgentClient, ConfigIngressServer, ControlCommandHandler, ControlFileWriter, ControlKind,
};
use ricbridge_common::write_frame;
use ricbridge_e2sm::indication_to_json;
use tokio::net::TcpStream;

#[tokio::test]
async fn test_kpi_publishing_reuses_connection() {
    init_test_logging();
    let agent = MockAgent::start().await.unwrap();
    let client = AgentClient::new(&agent_settings(agent.port()));

    let kpi = indication_to_json(GNB_MEID, &crate::kpm_payload());
    assert!(!kpi.is_empty());
    assert!(client.send_kpi(GNB_MEID, &kpi).await);
    assert!(client.send_kpi(GNB_MEID, &kpi).await);

    wait_for_condition(
        || async { agent.frames().len() == 2 },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();
    assert_eq!(client.connect_count(), 1);
    assert_eq!(agent.connection_count(), 1);

    let frames = agent.frames_of_type("kpi");
    assert_eq!(frames[0]["meid"], GNB_MEID);
    assert_eq!(frames[0]["kpi"]["serviceModel"], "KPM");
    assert_eq!(frames[0]["kpi"]["node_id"], 2);
    assert_eq!(frames[0]["kpi"]["pmContainers"], 2);
    assert_eq!(frames[0]["kpi"]["ues"][0]["ueId"], "01ab");
    assert_eq!(frames[0]["kpi"]["ues"][0]["measurements"][0]["value"], serde_json::Value::Null);
    assert_eq!(frames[0]["kpi"]["ues"][0]["measurements"][1]["rrcEvent"], "a3");

    client.shutdown().await;
}

#[tokio::test]
async fn test_recommendation_round_trip() {
    init_test_logging();
    let agent = MockAgent::start().await.unwrap();
    let client = AgentClient::new(&agent_settings(agent.port()));

    assert_eq!(client.get_recommendation("gnb:1", "{}").await, None);

    let cmd = r#"{"cmd":"set-mcs","node":1,"mcs":15}"#;
    agent.set_recommendation_reply(cmd);
    assert_eq!(
        client.get_recommendation("gnb:1", r#"{"serviceModel":"KPM"}"#).await,
        Some(cmd.to_string())
    );

    let requests = agent.frames_of_type("recommendation_request");
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1]["kpi"]["serviceModel"], "KPM");
    assert_eq!(client.connect_count(), 1);
}

#[tokio::test]
async fn test_unreachable_agent() {
    init_test_logging();
    let port = {
        let agent = MockAgent::start().await.unwrap();
        agent.port()
    };
    // Give the aborted accept loop time to release the port.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let client = AgentClient::new(&agent_settings(port));
    assert!(!client.send_kpi("gnb:1", "{}").await);
    assert_eq!(client.get_recommendation("gnb:1", "{}").await, None);
    assert!(!client.is_connected().await);
}

#[tokio::test]
async fn test_pushed_control_reaches_handler() {
    init_test_logging();
    let agent = MockAgent::start().await.unwrap();
    let client = AgentClient::new(&agent_settings(agent.port()));

    let received = Arc::new(Mutex::new(Vec::<(String, String)>::new()));
    let sink = Arc::clone(&received);
    let handler: Arc<dyn ControlCommandHandler> = Arc::new(move |meid: &str, cmd: &str| {
        sink.lock().unwrap().push((meid.to_string(), cmd.to_string()));
        true
    });
    client.start_control_command_listener(handler).await;
    assert!(client.is_listening());

    wait_for_condition(
        || async { agent.connection_count() == 1 },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();
    agent.push(r#"{"type":"control","meid":"gnb:7","cmd":{"cmd":"stop"}}"#);
    agent.push(r#"{"type":"qos_config","commands":[]}"#);
    agent.push(r#"{"type":"control","meid":"gnb:7","command":"{\"cmd\":\"set-bler\",\"bler\":0.2}"}"#);

    wait_for_condition(
        || async { received.lock().unwrap().len() == 2 },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();
    assert_eq!(
        *received.lock().unwrap(),
        vec![
            ("gnb:7".to_string(), r#"{"cmd":"stop"}"#.to_string()),
            ("gnb:7".to_string(), r#"{"cmd":"set-bler","bler":0.2}"#.to_string()),
        ]
    );

    // Without a handler the listener keeps running and drops commands.
    client.stop_control_command_listener();
    agent.push(r#"{"type":"control","meid":"gnb:7","cmd":"x"}"#);
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(received.lock().unwrap().len(), 2);
    assert!(client.is_listening());

    client.shutdown().await;
    assert!(!client.is_listening());
}

#[tokio::test]
async fn test_ingress_writes_control_files() {
    init_test_logging();
    let dir = std::env::temp_dir().join(format!("ricbridge-ingress-it-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    let writer = Arc::new(ControlFileWriter::new(&dir));

    let bind: SocketAddr = "127.0.0.1:0".parse().unwrap();
    let mut server = ConfigIngressServer::new(bind, 5, writer.clone());
    let addr = server.start().await.unwrap();

    let mut stream = TcpStream::connect(addr).await.unwrap();
    write_frame(
        &mut stream,
        br#"{"type":"handover","commands":[{"imsi":"001010000000001","targetCellId":3}]}"#,
    )
    .await
    .unwrap();

    let path = writer.path_for(ControlKind::Handover);
    let probe = path.clone();
    wait_for_condition(
        || {
            let probe = probe.clone();
            async move {
                std::fs::read_to_string(&probe)
                    .map(|contents| contents.ends_with('\n'))
                    .unwrap_or(false)
            }
        },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let row: Vec<&str> = contents.trim_end().split(',').collect();
    assert_eq!(row[1..], ["001010000000001", "3"]);

    server.stop().await;
    let _ = std::fs::remove_dir_all(&dir);
}
