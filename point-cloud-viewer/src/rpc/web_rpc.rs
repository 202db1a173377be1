use crate::engine::api::EngineRuntime;
use crate::viewer::fullscreen::FullscreenApi;
use crate::viewer::mount::{ViewerMount, ViewerSnapshot};
use crate::viewer::signals::SignalHub;
use serde::{Deserialize, Serialize};
use std::rc::Rc;
use tracing::{debug, error, info, warn};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsValue;

const JSONRPC_VERSION: &str = "2.0";
const SIGNALS_NOTIFICATION: &str = "viewer_signals";

/// JSON-RPC 2.0 request structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 response structure.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcError>,
    pub id: Option<serde_json::Value>,
}

/// JSON-RPC 2.0 notification structure for one-way communication.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RpcNotification {
    pub jsonrpc: String,
    pub method: String,
    pub params: serde_json::Value,
}

/// JSON-RPC 2.0 error object.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Operations a host may invoke over the bridge.
pub trait ViewerCommands {
    fn zoom_in(&self) -> bool;
    fn zoom_out(&self) -> bool;
    fn reset_view(&self) -> bool;
    fn toggle_fullscreen(&self);
    fn set_data_path(&self, data_path: &str);
    fn snapshot(&self) -> ViewerSnapshot;
    fn signals(&self) -> &SignalHub;
}

impl<E, F> ViewerCommands for ViewerMount<E, F>
where
    E: EngineRuntime,
    F: FullscreenApi<Container = E::Container>,
{
    fn zoom_in(&self) -> bool {
        self.controls().zoom_in()
    }

    fn zoom_out(&self) -> bool {
        self.controls().zoom_out()
    }

    fn reset_view(&self) -> bool {
        self.controls().reset_view()
    }

    fn toggle_fullscreen(&self) {
        self.controls().toggle_fullscreen();
    }

    fn set_data_path(&self, data_path: &str) {
        ViewerMount::set_data_path(self, data_path);
    }

    fn snapshot(&self) -> ViewerSnapshot {
        ViewerMount::snapshot(self)
    }

    fn signals(&self) -> &SignalHub {
        ViewerMount::signals(self)
    }
}

/// Outgoing transport, e.g. the parent window.
pub trait MessageSink {
    fn post(&self, message: &str);
}

/// Routes host messages to one viewer and pushes its signals back.
pub struct RpcBridge<C: ViewerCommands> {
    commands: Rc<C>,
    sink: Rc<dyn MessageSink>,
}

impl<C: ViewerCommands + 'static> RpcBridge<C> {
    pub fn new(commands: Rc<C>, sink: Rc<dyn MessageSink>) -> Self {
        Self { commands, sink }
    }

    /// Send the current signals to the host, then push every change as a
    /// `viewer_signals` notification.
    pub fn forward_signals(&self) {
        let signals = self.commands.signals();
        match serde_json::to_value(signals.current()) {
            Ok(params) => self.send_notification(SIGNALS_NOTIFICATION, params),
            Err(e) => error!("Failed to serialize viewer signals: {}", e),
        }

        let sink = Rc::clone(&self.sink);
        signals.subscribe(move |signals| match serde_json::to_value(signals) {
            Ok(params) => send_message(sink.as_ref(), &notification(SIGNALS_NOTIFICATION, params)),
            Err(e) => error!("Failed to serialize viewer signals: {}", e),
        });
        debug!("Forwarding viewer signals over RPC");
    }

    /// Handle one raw message. Anything that does not look like JSON-RPC is
    /// ignored.
    pub fn handle_message(&self, message: &str) {
        if !message.contains("jsonrpc") {
            return;
        }

        match serde_json::from_str::<RpcRequest>(message) {
            Ok(request) => {
                debug!("Processing RPC method: {}", request.method);
                if let Some(response) = handle_rpc_request(&request, self.commands.as_ref()) {
                    send_message(self.sink.as_ref(), &response);
                }
            }
            Err(parse_error) => {
                warn!("RPC parse error: {}", parse_error);
                let response = create_error_response(
                    serde_json::Value::Null,
                    RpcError::parse_error(&parse_error.to_string()),
                );
                send_message(self.sink.as_ref(), &response);
            }
        }
    }

    /// Send notification to the host without expecting a response.
    pub fn send_notification(&self, method: &str, params: serde_json::Value) {
        send_message(self.sink.as_ref(), &notification(method, params));
    }
}

/// Execute `request` and build its response. Notifications run and yield `None`.
pub fn handle_rpc_request<C: ViewerCommands + ?Sized>(
    request: &RpcRequest,
    commands: &C,
) -> Option<RpcResponse> {
    let id = request.id.clone();

    if request.jsonrpc != JSONRPC_VERSION {
        warn!("Unsupported JSON-RPC version: {}", request.jsonrpc);
        return id.map(|id| {
            create_error_response(id, RpcError::invalid_request("Expected jsonrpc \"2.0\""))
        });
    }

    let result = match request.method.as_str() {
        "zoom_in" => Ok(serde_json::json!({ "success": commands.zoom_in() })),
        "zoom_out" => Ok(serde_json::json!({ "success": commands.zoom_out() })),
        "reset_view" => Ok(serde_json::json!({ "success": commands.reset_view() })),
        "toggle_fullscreen" => {
            commands.toggle_fullscreen();
            Ok(serde_json::json!({ "success": true }))
        }
        "set_data_path" => handle_set_data_path(&request.params, commands),
        "get_state" => handle_get_state(commands),
        _ => {
            warn!("Unknown RPC method: {}", request.method);
            Err(RpcError::method_not_found(&request.method))
        }
    };

    // Only requests with IDs get a response.
    let id = id?;
    Some(match result {
        Ok(result_value) => RpcResponse {
            jsonrpc: JSONRPC_VERSION.to_string(),
            result: Some(result_value),
            error: None,
            id: Some(id),
        },
        Err(error) => create_error_response(id, error),
    })
}

fn handle_set_data_path<C: ViewerCommands + ?Sized>(
    params: &serde_json::Value,
    commands: &C,
) -> Result<serde_json::Value, RpcError> {
    #[derive(Deserialize)]
    struct SetDataPathParams {
        path: String,
    }

    let parsed = serde_json::from_value::<SetDataPathParams>(params.clone())
        .map_err(|_| RpcError::invalid_params("Expected 'path' parameter"))?;

    info!("Data path changed over RPC: {}", parsed.path);
    commands.set_data_path(&parsed.path);

    Ok(serde_json::json!({
        "success": true,
        "path": parsed.path
    }))
}

fn handle_get_state<C: ViewerCommands + ?Sized>(
    commands: &C,
) -> Result<serde_json::Value, RpcError> {
    serde_json::to_value(commands.snapshot())
        .map_err(|e| RpcError::internal_error(&format!("State not serializable: {e}")))
}

fn notification(method: &str, params: serde_json::Value) -> RpcNotification {
    RpcNotification {
        jsonrpc: JSONRPC_VERSION.to_string(),
        method: method.to_string(),
        params,
    }
}

fn create_error_response(id: serde_json::Value, error: RpcError) -> RpcResponse {
    RpcResponse {
        jsonrpc: JSONRPC_VERSION.to_string(),
        result: None,
        error: Some(error),
        id: Some(id),
    }
}

fn send_message<T: Serialize>(sink: &dyn MessageSink, message: &T) {
    match serde_json::to_string(message) {
        Ok(json) => sink.post(&json),
        Err(e) => error!("Failed to serialize message: {}", e),
    }
}

/// Standard RPC error codes and constructors.
impl RpcError {
    pub fn parse_error(message: &str) -> Self {
        Self {
            code: -32700,
            message: format!("Parse error: {message}"),
            data: None,
        }
    }

    pub fn invalid_request(message: &str) -> Self {
        Self {
            code: -32600,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn method_not_found(method: &str) -> Self {
        Self {
            code: -32601,
            message: "Method not found".to_string(),
            data: Some(serde_json::json!({ "method": method })),
        }
    }

    pub fn invalid_params(message: &str) -> Self {
        Self {
            code: -32602,
            message: message.to_string(),
            data: None,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self {
            code: -32603,
            message: message.to_string(),
            data: None,
        }
    }
}

/// Posts to the embedding page.
#[cfg(target_arch = "wasm32")]
pub struct ParentWindowSink;

#[cfg(target_arch = "wasm32")]
impl MessageSink for ParentWindowSink {
    fn post(&self, message: &str) {
        let Some(window) = web_sys::window() else {
            error!("Window object not available");
            return;
        };

        match window.parent() {
            Ok(Some(parent)) => {
                if let Err(e) = parent.post_message(&JsValue::from_str(message), "*") {
                    error!("Failed to send message to parent: {:?}", e);
                }
            }
            _ => warn!("No parent window available for message transmission"),
        }
    }
}

/// Feed `window` message events into `bridge` for the rest of the page's life.
#[cfg(target_arch = "wasm32")]
pub fn setup_message_listener<C: ViewerCommands + 'static>(
    bridge: Rc<RpcBridge<C>>,
) -> Result<(), JsValue> {
    use wasm_bindgen::JsCast;
    use wasm_bindgen::closure::Closure;
    use web_sys::MessageEvent;

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("window unavailable"))?;

    let closure = Closure::wrap(Box::new(move |event: MessageEvent| {
        if let Ok(data) = event.data().dyn_into::<js_sys::JsString>() {
            let message: String = data.into();
            bridge.handle_message(&message);
        }
    }) as Box<dyn FnMut(MessageEvent)>);

    window.add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())?;

    // Listener lives as long as the page.
    closure.forget();
    info!("RPC message listener registered");
    Ok(())
}
