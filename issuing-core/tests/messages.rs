use std::cell::RefCell;

use issuing_core::{
    relay_for_event, Environment, HostMessage, MessageRelay, MessageSink, ScaErrorDetail,
    ScaEventKind, ScaEventPayload, SdkInitConfig,
};
use serde_json::{json, Value};

/// Test double thay thế kênh của host.
#[derive(Default)]
struct CaptureSink {
    payloads: RefCell<Vec<String>>,
}

impl MessageSink for &CaptureSink {
    fn post_raw(&self, payload: &str) {
        self.payloads.borrow_mut().push(payload.to_string());
    }
}

fn single_key(payload: &str) -> (String, Value) {
    let value: Value = serde_json::from_str(payload).expect("Payload phải là JSON");
    let object = value.as_object().expect("Payload phải là object");
    assert_eq!(object.len(), 1, "đúng một khóa cấp cao nhất: {payload}");
    let (key, value) = object.iter().next().unwrap();
    (key.clone(), value.clone())
}

#[test]
fn js_ready_has_event_key() {
    let text = HostMessage::js_ready().to_json().unwrap();
    assert_eq!(single_key(&text), ("event".to_string(), json!("js_ready")));
}

#[test]
fn every_message_variant_serializes_to_one_key() {
    let cases = [
        (HostMessage::log("hello"), "log", json!("hello")),
        (HostMessage::error("boom"), "error", json!("boom")),
        (
            HostMessage::sca_setup_succeed(json!({"deviceId": "abc"})),
            "scaSetupSucceed",
            json!({"deviceId": "abc"}),
        ),
        (HostMessage::sca_token("tok"), "scaToken", json!("tok")),
        (HostMessage::is_physical(true), "isphysical", json!(true)),
    ];

    for (message, expected_key, expected_value) in cases {
        let (key, value) = single_key(&message.to_json().unwrap());
        assert_eq!(key, expected_key);
        assert_eq!(value, expected_value);
    }
}

#[test]
fn sca_setup_error_carries_documented_prefix() {
    let text = HostMessage::sca_setup_error("Network Error")
        .to_json()
        .unwrap();
    assert_eq!(
        single_key(&text),
        (
            "error".to_string(),
            json!("JS SCA Setup Error: Network Error")
        )
    );
}

#[test]
fn relay_payloads_stay_valid_json_for_quoted_reasons() {
    let sink = CaptureSink::default();
    let relay = MessageRelay::new(&sink);

    relay.report_error(r#"he said "no" and left a \ behind"#);

    let payloads = sink.payloads.borrow();
    assert_eq!(payloads.len(), 1);
    let (key, value) = single_key(&payloads[0]);
    assert_eq!(key, "error");
    assert_eq!(value, json!(r#"he said "no" and left a \ behind"#));
}

#[test]
fn each_vendor_event_relays_exactly_one_message() {
    let sink = CaptureSink::default();
    let relay = MessageRelay::new(&sink);

    for kind in ScaEventKind::ALL {
        relay.post(&relay_for_event(kind, ScaEventPayload::default()));
    }

    let payloads = sink.payloads.borrow();
    assert_eq!(payloads.len(), ScaEventKind::ALL.len());
    for payload in payloads.iter() {
        single_key(payload);
    }
}

#[test]
fn ready_and_cancel_relay_fixed_log_lines() {
    assert_eq!(
        relay_for_event(ScaEventKind::Ready, ScaEventPayload::default()),
        HostMessage::log("SCA Element is ready")
    );
    assert_eq!(
        relay_for_event(ScaEventKind::Cancel, ScaEventPayload::default()),
        HostMessage::log("SCA cancelled.")
    );
}

#[test]
fn setup_succeed_passes_mobile_info_through() {
    let payload = ScaEventPayload {
        mobile_info: Some(json!({"os": "android", "challenge": 42})),
        ..ScaEventPayload::default()
    };
    assert_eq!(
        relay_for_event(ScaEventKind::ScaSetupSucceed, payload),
        HostMessage::sca_setup_succeed(json!({"os": "android", "challenge": 42}))
    );
}

#[test]
fn verification_succeed_relays_token() {
    let payload = ScaEventPayload {
        token: Some("sca-token-1".to_string()),
        ..ScaEventPayload::default()
    };
    assert_eq!(
        relay_for_event(ScaEventKind::VerificationSucceed, payload),
        HostMessage::sca_token("sca-token-1")
    );
}

#[test]
fn verification_failed_prefers_reason_over_nested_message() {
    let payload = ScaEventPayload {
        reason: Some("expired challenge".to_string()),
        error: Some(ScaErrorDetail {
            message: Some("ignored".to_string()),
        }),
        ..ScaEventPayload::default()
    };
    assert_eq!(
        relay_for_event(ScaEventKind::VerificationFailed, payload),
        HostMessage::error("SCA Failed: expired challenge")
    );

    let nested_only = ScaEventPayload {
        error: Some(ScaErrorDetail {
            message: Some("device mismatch".to_string()),
        }),
        ..ScaEventPayload::default()
    };
    assert_eq!(
        relay_for_event(ScaEventKind::VerificationFailed, nested_only),
        HostMessage::error("SCA Failed: device mismatch")
    );

    assert_eq!(
        relay_for_event(ScaEventKind::VerificationFailed, ScaEventPayload::default()),
        HostMessage::error("SCA Failed: Unknown SCA failure")
    );
}

#[test]
fn element_error_prefers_message_then_code() {
    let with_message = ScaEventPayload {
        error: Some(ScaErrorDetail {
            message: Some("invalid session".to_string()),
        }),
        code: Some("E42".to_string()),
        ..ScaEventPayload::default()
    };
    assert_eq!(
        relay_for_event(ScaEventKind::Error, with_message),
        HostMessage::error("SCA Error: invalid session")
    );

    let code_only = ScaEventPayload {
        code: Some("E42".to_string()),
        ..ScaEventPayload::default()
    };
    assert_eq!(
        relay_for_event(ScaEventKind::Error, code_only),
        HostMessage::error("SCA Error: E42")
    );

    assert_eq!(
        relay_for_event(ScaEventKind::Error, ScaEventPayload::default()),
        HostMessage::error("SCA Error: Unknown SCA element error")
    );
}

#[test]
fn event_payload_tolerates_unknown_fields() {
    let payload: ScaEventPayload = serde_json::from_value(json!({
        "token": "tok",
        "source": "vendor",
        "timestamp": 1700000000
    }))
    .unwrap();
    assert_eq!(payload.token.as_deref(), Some("tok"));
}

#[test]
fn sdk_init_config_carries_fixed_capabilities() {
    let config = SdkInitConfig::new(
        Environment::from_raw("staging"),
        "fr",
        "auth-1",
        "client-1",
        "verifier-1",
    );
    let value = serde_json::to_value(&config).unwrap();

    assert_eq!(value["env"], json!("demo"));
    assert_eq!(value["langKey"], json!("fr"));
    assert_eq!(value["authCode"], json!("auth-1"));
    assert_eq!(value["clientId"], json!("client-1"));
    assert_eq!(value["codeVerifier"], json!("verifier-1"));
    assert_eq!(value["capabilities"], json!(["scaSetup", "scaVerify"]));
}
