//! Cầu nối WebAssembly giữa web view di động và SDK SCA của Airwallex.
//!
//! Expose `startSca` và `showDetails` cho trang host, đồng thời chuyển tiếp
//! các sự kiện vòng đời của SDK tới ứng dụng host qua kênh đã inject.

#[cfg(target_arch = "wasm32")]
mod wasm_bridge {
    use issuing_core::{
        pci_iframe_url, relay_for_event, CardView, DisplayConfig, Environment, HostMessage,
        MessageRelay, MessageSink, ScaElementConfig, ScaEventKind, ScaEventPayload, SdkInitConfig,
        CONTAINER_ID, DEFAULT_LANG_KEY, HOST_CHANNEL,
    };
    use serde_wasm_bindgen::{from_value, to_value};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{console, Document, HtmlIFrameElement};

    #[wasm_bindgen]
    extern "C" {
        /// Handle tới đối tượng SDK của vendor do trang host cung cấp.
        pub type ScaSdk;

        #[wasm_bindgen(method, catch)]
        fn init(this: &ScaSdk, config: &JsValue) -> Result<js_sys::Promise, JsValue>;

        #[wasm_bindgen(method, catch, js_name = createElement)]
        fn create_element(
            this: &ScaSdk,
            kind: &str,
            config: &JsValue,
        ) -> Result<js_sys::Promise, JsValue>;

        /// Verification UI element do `createElement` trả về.
        pub type ScaElement;

        #[wasm_bindgen(method, catch)]
        fn mount(this: &ScaElement, container_id: &str) -> Result<(), JsValue>;

        #[wasm_bindgen(method)]
        fn on(this: &ScaElement, event: &str, handler: &js_sys::Function);
    }

    /// Sink dựa trên `window[HOST_CHANNEL].postMessage`. Kênh được tra cứu
    /// lại ở mỗi lần gọi; khi thiếu kênh thì payload được log rồi bỏ,
    /// không xếp hàng đợi.
    struct WebViewSink;

    impl MessageSink for WebViewSink {
        fn post_raw(&self, payload: &str) {
            if let Err(err) = post_to_channel(payload) {
                console::warn_2(
                    &JsValue::from_str("Kênh host không khả dụng, bỏ thông điệp:"),
                    &err,
                );
                console::log_1(&JsValue::from_str(payload));
            }
        }
    }

    fn post_to_channel(payload: &str) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("Không có window"))?;
        let channel = js_sys::Reflect::get(&window, &JsValue::from_str(HOST_CHANNEL))?;
        if channel.is_undefined() || channel.is_null() {
            return Err(JsValue::from_str(HOST_CHANNEL));
        }
        let post = js_sys::Reflect::get(&channel, &JsValue::from_str("postMessage"))?;
        let post: js_sys::Function = post.dyn_into()?;
        post.call1(&channel, &JsValue::from_str(payload))?;
        Ok(())
    }

    fn host_relay() -> MessageRelay<WebViewSink> {
        MessageRelay::new(WebViewSink)
    }

    /// Ưu tiên trường `message` của lỗi, rơi về stringify khi không có.
    fn describe_js_error(err: &JsValue) -> String {
        if let Ok(message) = js_sys::Reflect::get(err, &JsValue::from_str("message")) {
            if let Some(text) = message.as_string() {
                if !text.is_empty() {
                    return text;
                }
            }
        }
        err.as_string().unwrap_or_else(|| format!("{err:?}"))
    }

    fn document() -> Result<Document, JsValue> {
        web_sys::window()
            .and_then(|window| window.document())
            .ok_or_else(|| JsValue::from_str("Không truy cập được document"))
    }

    #[wasm_bindgen(start)]
    pub fn activate() {
        console_error_panic_hook::set_once();
        host_relay().post(&HostMessage::js_ready());
    }

    /// Chuyển tiếp một lỗi chưa bắt được của trang host qua kênh thông điệp.
    #[wasm_bindgen(js_name = reportError)]
    pub fn report_error(error: JsValue) {
        host_relay().report_error(&describe_js_error(&error));
    }

    /// Khởi tạo SDK của vendor, mount verification element và chuyển tiếp
    /// các sự kiện vòng đời của nó cho host. Fire-and-forget: mọi thất bại
    /// được chuyển thành đúng một thông điệp lỗi, không ném ra ngoài.
    #[allow(clippy::too_many_arguments)]
    #[wasm_bindgen(js_name = startSca)]
    pub async fn start_sca(
        sdk: ScaSdk,
        user_email: String,
        lang_key: String,
        env: String,
        auth_code: String,
        client_id: String,
        code_verifier: String,
        sca_session_code: String,
    ) {
        let relay = host_relay();
        let outcome = run_sca(
            &sdk,
            user_email,
            lang_key,
            &env,
            auth_code,
            client_id,
            code_verifier,
            sca_session_code,
        )
        .await;

        if let Err(err) = outcome {
            relay.post(&HostMessage::sca_setup_error(describe_js_error(&err)));
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_sca(
        sdk: &ScaSdk,
        user_email: String,
        lang_key: String,
        env: &str,
        auth_code: String,
        client_id: String,
        code_verifier: String,
        sca_session_code: String,
    ) -> Result<(), JsValue> {
        let env = Environment::from_raw(env);
        let init_config = SdkInitConfig::new(env, lang_key, auth_code, client_id, code_verifier);
        let init_config =
            to_value(&init_config).map_err(|err| JsValue::from_str(&err.to_string()))?;
        JsFuture::from(sdk.init(&init_config)?).await?;

        let element_config = ScaElementConfig {
            user_email,
            sca_session_code,
        };
        let element_config =
            to_value(&element_config).map_err(|err| JsValue::from_str(&err.to_string()))?;
        let element = JsFuture::from(sdk.create_element("scaVerify", &element_config)?).await?;
        let element: ScaElement = element.unchecked_into();

        element.mount(CONTAINER_ID)?;
        observe_element(&element);
        Ok(())
    }

    /// Đăng ký mỗi sự kiện vendor một observer; mỗi observer chuyển tiếp
    /// đúng một thông điệp cho host. Handler sống cùng element nên các
    /// closure được leak có chủ đích.
    fn observe_element(element: &ScaElement) {
        for kind in ScaEventKind::ALL {
            let handler = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
                let payload: ScaEventPayload = from_value(event).unwrap_or_default();
                host_relay().post(&relay_for_event(kind, payload));
            });
            element.on(kind.vendor_name(), handler.as_ref().unchecked_ref());
            handler.forget();
        }
    }

    /// Xóa sạch container hiển thị rồi nhúng trang PCI của vendor cho thẻ.
    /// Đồng bộ và idempotent; thất bại được chuyển tiếp, không ném.
    /// `_is_single_use` vẫn nằm trong chữ ký phía host nhưng không dùng.
    #[wasm_bindgen(js_name = showDetails)]
    pub fn show_details(
        token: String,
        provider_card_id: String,
        env: String,
        is_physical: bool,
        _is_single_use: Option<bool>,
        lang_key: Option<String>,
    ) {
        let relay = host_relay();
        if let Err(err) =
            render_card_frame(&relay, token, &provider_card_id, &env, is_physical, lang_key)
        {
            relay.report_error(&describe_js_error(&err));
        }
    }

    fn render_card_frame(
        relay: &MessageRelay<WebViewSink>,
        token: String,
        provider_card_id: &str,
        env: &str,
        is_physical: bool,
        lang_key: Option<String>,
    ) -> Result<(), JsValue> {
        let document = document()?;
        let container = document.get_element_by_id(CONTAINER_ID).ok_or_else(|| {
            JsValue::from_str(&format!("Không tìm thấy container #{CONTAINER_ID}"))
        })?;
        container.set_inner_html("");

        relay.post(&HostMessage::is_physical(is_physical));

        let (view, config) = if is_physical {
            (CardView::Pin, DisplayConfig::for_pin(token))
        } else {
            let lang_key = lang_key.unwrap_or_else(|| DEFAULT_LANG_KEY.to_string());
            (CardView::Details, DisplayConfig::for_details(token, lang_key))
        };

        let env = Environment::from_raw(env);
        let url = pci_iframe_url(env, provider_card_id, view, &config)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let frame: HtmlIFrameElement = document.create_element("iframe")?.dyn_into()?;
        frame.set_src(&url);
        frame.set_attribute("style", "width: 100%; height: 500px; border: none;")?;
        container.append_child(&frame)?;
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm_bridge::{activate, report_error, show_details, start_sca, ScaElement, ScaSdk};

#[cfg(not(target_arch = "wasm32"))]
fn unsupported() -> wasm_bindgen::JsValue {
    wasm_bindgen::JsValue::from_str("issuing-wasm chỉ hỗ trợ biên dịch target wasm32")
}

#[cfg(not(target_arch = "wasm32"))]
pub fn report_error(_: wasm_bindgen::JsValue) -> Result<(), wasm_bindgen::JsValue> {
    Err(unsupported())
}

#[cfg(not(target_arch = "wasm32"))]
#[allow(clippy::too_many_arguments)]
pub fn start_sca(
    _: wasm_bindgen::JsValue,
    _: &str,
    _: &str,
    _: &str,
    _: &str,
    _: &str,
    _: &str,
    _: &str,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(unsupported())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn show_details(
    _: &str,
    _: &str,
    _: &str,
    _: bool,
    _: Option<bool>,
    _: Option<String>,
) -> Result<(), wasm_bindgen::JsValue> {
    Err(unsupported())
}
