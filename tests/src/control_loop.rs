//! Control loop tests
//!
//! Drive the xApp receive loop with RMR messages and follow the result all
//! the way to the simulator:
//! 1. A RIC indication is decoded and published to the agent
//! 2. The agent's recommendation becomes a RIC CONTROL REQUEST
//! 3. The simulator executor validates it and applies it on its own loop

use std::sync::Arc;

use crate::{
    agent_settings, hello_world_payload, init_test_logging, kpm_payload, ric_indication,
    wait_for_condition, JsonE2apCodec, MockAgent, MockRmr, MockRmrInjector, DEFAULT_POLL_INTERVAL,
    DEFAULT_TEST_TIMEOUT, GNB_MEID,
};
use ricbridge_agent::AgentClient;
use ricbridge_common::{E2apCodec, XappSettings};
use ricbridge_sim::{
    run_now_queue, ControlCommand, ControlExecutor, ControlRequestError, EnbState, InMemoryRan,
    McsSetting, Position, RanModel, SimNode,
};
use ricbridge_xapp::{
    MessageDispatcher, ReceiverStats, RicMessage, RmrControlSender, XappReceiver, A1_POLICY_REQ,
    A1_POLICY_RESP, HEALTH_CHECK_ACK, RIC_CONTROL_REQ, RIC_HEALTH_CHECK_REQ,
    RIC_HEALTH_CHECK_RESP, RIC_INDICATION,
};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// The xApp wired to a mock agent and a mock RMR transport.
struct XappHarness {
    agent: MockAgent,
    client: Arc<AgentClient>,
    rmr: Arc<MockRmr>,
    injector: MockRmrInjector,
    sender: Arc<RmrControlSender>,
    shutdown: watch::Sender<bool>,
    receiver: JoinHandle<ReceiverStats>,
}

impl XappHarness {
    async fn start() -> Self {
        init_test_logging();
        let agent = MockAgent::start().await.unwrap();
        let settings = XappSettings::default();
        let codec = Arc::new(JsonE2apCodec);
        let client = Arc::new(AgentClient::new(&agent_settings(agent.port())));
        let (rmr, injector) = MockRmr::new();
        let rmr = Arc::new(rmr);

        let sender = Arc::new(RmrControlSender::from_settings(
            &settings,
            rmr.clone(),
            codec.clone(),
        ));
        let mut dispatcher = MessageDispatcher::new(&settings, codec, client.clone());
        dispatcher.set_control_sender(sender.clone());

        let (shutdown, shutdown_rx) = watch::channel(false);
        let receiver = XappReceiver::new(rmr.clone(), Arc::new(dispatcher));
        let receiver = tokio::spawn(async move { receiver.run(shutdown_rx).await });

        Self {
            agent,
            client,
            rmr,
            injector,
            sender,
            shutdown,
            receiver,
        }
    }

    fn inject_indication(&self, e2sm_payload: Vec<u8>) {
        let pdu = JsonE2apCodec
            .encode_indication(&ric_indication(e2sm_payload))
            .unwrap();
        assert!(self
            .injector
            .inject(RicMessage::new(RIC_INDICATION, pdu).with_meid(GNB_MEID)));
    }

    async fn wait_for_control_requests(&self, count: usize) {
        wait_for_condition(
            || async { self.rmr.sent().len() >= count },
            DEFAULT_TEST_TIMEOUT,
            DEFAULT_POLL_INTERVAL,
        )
        .await
        .unwrap();
    }

    async fn stop(self) -> ReceiverStats {
        self.shutdown.send(true).unwrap();
        let stats = self.receiver.await.unwrap();
        self.client.shutdown().await;
        stats
    }
}

fn simulated_ran() -> InMemoryRan {
    InMemoryRan::new(vec![
        SimNode {
            position: Some(Position::new(0.0, 0.0, 25.0)),
            enb: Some(EnbState::default()),
            apps: Vec::new(),
        },
        SimNode {
            position: Some(Position::new(500.0, 0.0, 25.0)),
            enb: Some(EnbState::default()),
            apps: Vec::new(),
        },
    ])
}

#[tokio::test]
async fn test_indication_to_simulator_mutation() {
    let xapp = XappHarness::start().await;
    xapp.agent
        .set_recommendation_reply(r#"{"cmd":"set-mcs","node":1,"mcs":15}"#);

    xapp.inject_indication(kpm_payload());
    xapp.wait_for_control_requests(1).await;

    // The agent saw the KPI publication and the recommendation request.
    let kpis = xapp.agent.frames_of_type("kpi");
    let requests = xapp.agent.frames_of_type("recommendation_request");
    assert_eq!(kpis.len(), 1);
    assert_eq!(requests.len(), 1);
    assert_eq!(kpis[0]["kpi"], requests[0]["kpi"]);
    assert_eq!(kpis[0]["kpi"]["cellObjectID"], "CELL_1");
    assert_eq!(kpis[0]["kpi"]["measurements"][1]["value"], 0.75);

    let sent = xapp.rmr.sent();
    assert_eq!(sent[0].mtype, RIC_CONTROL_REQ);
    assert_eq!(sent[0].meid.as_deref(), Some(GNB_MEID));

    // Simulator side: decode, validate, and apply only when the loop runs.
    let (scheduler, mut sim) = run_now_queue();
    let executor = ControlExecutor::new(Arc::new(JsonE2apCodec), scheduler);
    let mut ran = simulated_ran();

    let command = executor.handle_pdu(&sent[0].payload).unwrap();
    assert_eq!(
        command,
        ControlCommand::SetMcs {
            node: Some(1),
            dl: Some(McsSetting::Fixed(15)),
            ul: Some(McsSetting::Fixed(15)),
        }
    );
    assert_eq!(ran.node(1).unwrap().enb.as_ref().unwrap().dl_mcs, McsSetting::Adaptive);
    assert_eq!(sim.run_pending(&mut ran), 1);
    assert_eq!(ran.node(1).unwrap().enb.as_ref().unwrap().dl_mcs, McsSetting::Fixed(15));
    assert_eq!(ran.node(0).unwrap().enb.as_ref().unwrap().dl_mcs, McsSetting::Adaptive);

    let stats = xapp.stop().await;
    assert_eq!(stats.received, 1);
}

#[tokio::test]
async fn test_out_of_range_recommendation_is_not_applied() {
    let xapp = XappHarness::start().await;
    xapp.agent
        .set_recommendation_reply(r#"{"cmd":"set-mcs","node":1,"mcs":30}"#);

    xapp.inject_indication(kpm_payload());
    xapp.wait_for_control_requests(1).await;

    let (scheduler, mut sim) = run_now_queue();
    let executor = ControlExecutor::new(Arc::new(JsonE2apCodec), scheduler);
    let mut ran = simulated_ran();
    let before = ran.clone();

    assert!(matches!(
        executor.handle_pdu(&xapp.rmr.sent()[0].payload),
        Err(ControlRequestError::Command(_))
    ));
    assert_eq!(sim.run_pending(&mut ran), 0);
    assert_eq!(ran, before);

    xapp.stop().await;
}

#[tokio::test]
async fn test_no_action_recommendation_sends_nothing() {
    let xapp = XappHarness::start().await;

    xapp.inject_indication(hello_world_payload("Hello from RAN"));
    wait_for_condition(
        || async { xapp.agent.frames_of_type("recommendation_request").len() == 1 },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();

    let kpis = xapp.agent.frames_of_type("kpi");
    assert_eq!(kpis[0]["kpi"]["serviceModel"], "HelloWorld");
    assert_eq!(kpis[0]["kpi"]["indicationMessage"], "Hello from RAN");

    // Undecodable E2SM payloads are dropped without reaching the agent.
    xapp.inject_indication(vec![0xff, 0xff, 0xff]);
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    assert_eq!(xapp.agent.frames_of_type("kpi").len(), 1);
    assert!(xapp.rmr.sent().is_empty());

    let stats = xapp.stop().await;
    assert_eq!(stats.received, 2);
}

#[tokio::test]
async fn test_health_check_and_a1_policy_are_answered() {
    let xapp = XappHarness::start().await;

    xapp.injector
        .inject(RicMessage::new(RIC_HEALTH_CHECK_REQ, &b"ping"[..]));
    // Not answered; the CREATE behind it proves it was handled.
    xapp.injector.inject(RicMessage::new(
        A1_POLICY_REQ,
        &br#"{"operation":"DELETE","policy_type_id":"1","policy_instance_id":"p-7"}"#[..],
    ));
    xapp.injector.inject(RicMessage::new(
        A1_POLICY_REQ,
        &br#"{"operation":"CREATE","policy_type_id":"1","policy_instance_id":"p-7","payload":{"threshold":3}}"#[..],
    ));

    wait_for_condition(
        || async { xapp.rmr.returned().len() == 2 },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();

    let returned = xapp.rmr.returned();
    assert_eq!(returned[0].mtype, RIC_HEALTH_CHECK_RESP);
    assert_eq!(&returned[0].payload[..], HEALTH_CHECK_ACK);

    assert_eq!(returned[1].mtype, A1_POLICY_RESP);
    assert_eq!(
        std::str::from_utf8(&returned[1].payload).unwrap(),
        r#"{"handler_id":"ricbridge-xapp","payload":{"threshold":3},"policy_instance_id":"p-7","policy_type_id":"1","status":"OK"}"#
    );

    let stats = xapp.stop().await;
    assert_eq!(stats.received, 3);
    assert_eq!(stats.replied, 2);
}

#[tokio::test]
async fn test_pushed_command_is_relayed_and_applied() {
    let xapp = XappHarness::start().await;
    xapp.client
        .start_control_command_listener(xapp.sender.clone())
        .await;
    wait_for_condition(
        || async { xapp.agent.connection_count() == 1 },
        DEFAULT_TEST_TIMEOUT,
        DEFAULT_POLL_INTERVAL,
    )
    .await
    .unwrap();

    xapp.agent.push(
        r#"{"type":"control","meid":"gnb:9","cmd":{"cmd":"move-enb","node":0,"dx":10,"dy":-5}}"#,
    );
    xapp.wait_for_control_requests(1).await;

    let sent = xapp.rmr.sent();
    assert_eq!(sent[0].meid.as_deref(), Some("gnb:9"));
    let request = JsonE2apCodec.decode_control_request(&sent[0].payload).unwrap();
    assert_eq!(request.ran_function_id, 300);

    let (scheduler, mut sim) = run_now_queue();
    let executor = ControlExecutor::new(Arc::new(JsonE2apCodec), scheduler);
    let mut ran = simulated_ran();
    executor.handle_request(&request).unwrap();
    sim.run_pending(&mut ran);
    assert_eq!(ran.position(0), Some(Position::new(10.0, -5.0, 25.0)));

    xapp.stop().await;
}
