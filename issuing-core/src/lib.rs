//! Logic lõi cho cầu nối web-view phát hành thẻ: chọn môi trường, thông điệp
//! gửi host, ánh xạ sự kiện SCA và dựng URL iframe PCI.

pub mod rules;

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Id DOM của phần tử trên trang host mà cả hai entry point render vào.
pub const CONTAINER_ID: &str = "airwallex-container";

/// Tên global của đối tượng kênh do ứng dụng host inject.
pub const HOST_CHANNEL: &str = "ScaBridge";

/// Các capability yêu cầu từ SDK của vendor khi khởi tạo.
pub const SCA_CAPABILITIES: [&str; 2] = ["scaSetup", "scaVerify"];

/// Lý do mặc định khi verification thất bại không kèm chi tiết.
pub const UNKNOWN_SCA_FAILURE: &str = "Unknown SCA failure";

/// Thông báo mặc định khi lỗi element không kèm chi tiết.
pub const UNKNOWN_ELEMENT_ERROR: &str = "Unknown SCA element error";

/// Lỗi nội bộ của cầu nối.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("Không serialize được: {0}")]
    Serialize(String),
}

/// Môi trường triển khai do ứng dụng host chọn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Prod,
    Demo,
}

impl Environment {
    /// Chỉ đúng chuỗi `"prod"` chọn production; mọi giá trị khác là demo.
    pub fn from_raw(raw: &str) -> Self {
        if raw == "prod" {
            Environment::Prod
        } else {
            Environment::Demo
        }
    }

    /// Giá trị môi trường truyền cho SDK của vendor.
    pub fn sdk_env(self) -> &'static str {
        match self {
            Environment::Prod => "prod",
            Environment::Demo => "demo",
        }
    }

    /// Host phục vụ các trang PCI của vendor.
    pub fn pci_host(self) -> &'static str {
        match self {
            Environment::Prod => "www.airwallex.com",
            Environment::Demo => "demo.airwallex.com",
        }
    }
}

/// Một thông điệp gửi ra ứng dụng host. Mỗi variant serialize thành một
/// object JSON với đúng một khóa cấp cao nhất.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum HostMessage {
    Event { event: String },
    Log { log: String },
    Error { error: String },
    ScaSetupSucceed {
        #[serde(rename = "scaSetupSucceed")]
        sca_setup_succeed: Value,
    },
    ScaToken {
        #[serde(rename = "scaToken")]
        sca_token: String,
    },
    IsPhysical { isphysical: bool },
}

impl HostMessage {
    /// Tín hiệu phát đúng một lần khi module bridge nạp xong.
    pub fn js_ready() -> Self {
        HostMessage::Event {
            event: "js_ready".to_string(),
        }
    }

    pub fn log(text: impl Into<String>) -> Self {
        HostMessage::Log { log: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        HostMessage::Error { error: text.into() }
    }

    /// Lỗi của luồng khởi tạo SCA, mang tiền tố cố định mà host nhận diện.
    pub fn sca_setup_error(reason: impl AsRef<str>) -> Self {
        HostMessage::Error {
            error: format!("JS SCA Setup Error: {}", reason.as_ref()),
        }
    }

    /// Payload setup từ vendor, chuyển tiếp nguyên vẹn.
    pub fn sca_setup_succeed(mobile_info: Value) -> Self {
        HostMessage::ScaSetupSucceed {
            sca_setup_succeed: mobile_info,
        }
    }

    pub fn sca_token(token: impl Into<String>) -> Self {
        HostMessage::ScaToken {
            sca_token: token.into(),
        }
    }

    pub fn is_physical(flag: bool) -> Self {
        HostMessage::IsPhysical { isphysical: flag }
    }

    pub fn to_json(&self) -> Result<String, BridgeError> {
        serde_json::to_string(self).map_err(|err| BridgeError::Serialize(err.to_string()))
    }
}

/// Capability vận chuyển do host runtime cung cấp cho thông điệp gửi ra.
/// Gửi kiểu fire-and-forget; thiếu kênh do implementation tự xử lý.
pub trait MessageSink {
    fn post_raw(&self, payload: &str);
}

/// Serialize thông điệp rồi đưa cho sink, mỗi lần gọi đúng một payload.
pub struct MessageRelay<S> {
    sink: S,
}

impl<S: MessageSink> MessageRelay<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Không bao giờ ném lỗi: serialize thất bại suy biến thành payload lỗi,
    /// tự nó vẫn là JSON hợp lệ.
    pub fn post(&self, message: &HostMessage) {
        let payload = message.to_json().unwrap_or_else(|err| {
            serde_json::json!({ "error": err.to_string() }).to_string()
        });
        self.sink.post_raw(&payload);
    }

    pub fn report_error(&self, reason: &str) {
        self.post(&HostMessage::error(reason));
    }
}

/// Các sự kiện SCA element mà bridge quan sát. Tập này cố định; sự kiện
/// ngoài tập không được đăng ký nên không bao giờ được chuyển tiếp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaEventKind {
    Ready,
    ScaSetupSucceed,
    VerificationSucceed,
    VerificationFailed,
    Error,
    Cancel,
}

impl ScaEventKind {
    pub const ALL: [ScaEventKind; 6] = [
        ScaEventKind::Ready,
        ScaEventKind::ScaSetupSucceed,
        ScaEventKind::VerificationSucceed,
        ScaEventKind::VerificationFailed,
        ScaEventKind::Error,
        ScaEventKind::Cancel,
    ];

    /// Tên sự kiện dùng khi đăng ký với element của vendor.
    pub fn vendor_name(self) -> &'static str {
        match self {
            ScaEventKind::Ready => "ready",
            ScaEventKind::ScaSetupSucceed => "scaSetupSucceed",
            ScaEventKind::VerificationSucceed => "verificationSucceed",
            ScaEventKind::VerificationFailed => "verificationFailed",
            ScaEventKind::Error => "error",
            ScaEventKind::Cancel => "cancel",
        }
    }
}

/// Object chi tiết mà một số sự kiện vendor lồng dưới `error`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScaErrorDetail {
    #[serde(default)]
    pub message: Option<String>,
}

/// Hình dạng payload dùng chung cho các sự kiện element. Mọi trường đều
/// tùy chọn; mỗi sự kiện chỉ dùng một phần.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScaEventPayload {
    #[serde(default)]
    pub mobile_info: Option<Value>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub error: Option<ScaErrorDetail>,
    #[serde(default)]
    pub code: Option<String>,
}

/// Ánh xạ một sự kiện vendor sang thông điệp chuyển tiếp cho host.
pub fn relay_for_event(kind: ScaEventKind, payload: ScaEventPayload) -> HostMessage {
    match kind {
        ScaEventKind::Ready => HostMessage::log("SCA Element is ready"),
        ScaEventKind::ScaSetupSucceed => {
            HostMessage::sca_setup_succeed(payload.mobile_info.unwrap_or(Value::Null))
        }
        ScaEventKind::VerificationSucceed => {
            HostMessage::sca_token(payload.token.unwrap_or_default())
        }
        ScaEventKind::VerificationFailed => {
            let reason = payload
                .reason
                .or_else(|| payload.error.and_then(|detail| detail.message))
                .unwrap_or_else(|| UNKNOWN_SCA_FAILURE.to_string());
            HostMessage::error(format!("SCA Failed: {reason}"))
        }
        ScaEventKind::Error => {
            let message = payload
                .error
                .and_then(|detail| detail.message)
                .or(payload.code)
                .unwrap_or_else(|| UNKNOWN_ELEMENT_ERROR.to_string());
            HostMessage::error(format!("SCA Error: {message}"))
        }
        ScaEventKind::Cancel => HostMessage::log("SCA cancelled."),
    }
}

/// Tham số khởi tạo SDK của vendor.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SdkInitConfig {
    pub env: String,
    pub lang_key: String,
    pub auth_code: String,
    pub client_id: String,
    pub code_verifier: String,
    pub capabilities: Vec<String>,
}

impl SdkInitConfig {
    pub fn new(
        env: Environment,
        lang_key: impl Into<String>,
        auth_code: impl Into<String>,
        client_id: impl Into<String>,
        code_verifier: impl Into<String>,
    ) -> Self {
        Self {
            env: env.sdk_env().to_string(),
            lang_key: lang_key.into(),
            auth_code: auth_code.into(),
            client_id: client_id.into(),
            code_verifier: code_verifier.into(),
            capabilities: SCA_CAPABILITIES.iter().map(|cap| cap.to_string()).collect(),
        }
    }
}

/// Tham số tạo verification element của vendor.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ScaElementConfig {
    pub user_email: String,
    pub sca_session_code: String,
}

/// View PCI do vendor host cần nhúng.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardView {
    Pin,
    Details,
}

impl CardView {
    pub fn path_segment(self) -> &'static str {
        match self {
            CardView::Pin => "pin",
            CardView::Details => "details",
        }
    }
}

/// Quy tắc style selector → thuộc tính/giá trị bơm vào trang PCI.
pub type StyleRules = BTreeMap<String, BTreeMap<String, String>>;

/// Cấu hình serialize vào fragment URL của iframe. Dùng đúng một lần cho
/// mỗi lần gọi `showDetails`, không lưu trữ.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisplayConfig {
    pub token: String,
    #[serde(rename = "langKey", skip_serializing_if = "Option::is_none")]
    pub lang_key: Option<String>,
    pub rules: StyleRules,
}

impl DisplayConfig {
    /// View PIN: chỉ token, một quy tắc style `.pin`, không có khóa ngôn ngữ.
    pub fn for_pin(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            lang_key: None,
            rules: rules::pin_rules(),
        }
    }

    /// View chi tiết: token cùng khóa ngôn ngữ và bộ style cố định.
    pub fn for_details(token: impl Into<String>, lang_key: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            lang_key: Some(lang_key.into()),
            rules: rules::detail_rules(),
        }
    }
}

/// Khóa ngôn ngữ áp dụng khi host bỏ trống cho view chi tiết.
pub const DEFAULT_LANG_KEY: &str = "en";

// Các ký tự giữ nguyên khớp với `encodeURIComponent` của JavaScript.
const FRAGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Dựng URL trang PCI của vendor với cấu hình mã hóa trong fragment.
pub fn pci_iframe_url(
    env: Environment,
    provider_card_id: &str,
    view: CardView,
    config: &DisplayConfig,
) -> Result<String, BridgeError> {
    let json =
        serde_json::to_string(config).map_err(|err| BridgeError::Serialize(err.to_string()))?;
    let encoded = utf8_percent_encode(&json, FRAGMENT_SET);
    Ok(format!(
        "https://{}/issuing/pci/v2/{}/{}#{}",
        env.pci_host(),
        provider_card_id,
        view.path_segment(),
        encoded
    ))
}
