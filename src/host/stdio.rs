//! The stdio side of the host contract. The host spawns the plugin and
//! speaks line-delimited JSON-RPC 2.0: requests and notifications arrive
//! on stdin, responses and plugin notifications leave on stdout. stderr is
//! free for logging.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Stdout};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::PluginConfig;
use crate::error::SpotiqError;
use crate::host::api::HostHandle;
use crate::host::jsonrpc::{
    Frame, Notification, ResponseFrame, HANDLER_ERROR, INVALID_PARAMS, METHOD_NOT_FOUND,
    PARSE_ERROR,
};
use crate::host::types::{ActionCommand, DeepLink, PluginQuery};
use crate::plugin::SpotifyPlugin;

type SharedWriter = Arc<Mutex<BufWriter<Stdout>>>;

/// Host handle that emits plugin→host notifications on stdout, sharing
/// the writer with the serve loop's responses.
pub struct StdioHost {
    out: SharedWriter,
}

impl StdioHost {
    fn new(out: SharedWriter) -> Self {
        Self { out }
    }

    async fn notify(
        &self,
        method: &str,
        params: Option<serde_json::Value>,
    ) -> Result<(), SpotiqError> {
        let notif = Notification::new(method, params);
        let json = serde_json::to_string(&notif)
            .map_err(|e| SpotiqError::Protocol(format!("Failed to serialize notification: {e}")))?;
        debug!(method, "sending notification");
        write_line(&self.out, &json).await
    }
}

#[async_trait]
impl HostHandle for StdioHost {
    async fn change_query(&self, query: &str) -> Result<(), SpotiqError> {
        self.notify("changeQuery", Some(serde_json::json!({ "query": query })))
            .await
    }

    async fn show_app(&self) -> Result<(), SpotiqError> {
        self.notify("showApp", None).await
    }

    async fn store_setting(&self, key: &str, value: &str) -> Result<(), SpotiqError> {
        self.notify(
            "storeSetting",
            Some(serde_json::json!({ "key": key, "value": value })),
        )
        .await
    }
}

fn encode(resp: &ResponseFrame) -> Result<String, SpotiqError> {
    serde_json::to_string(resp)
        .map_err(|e| SpotiqError::Protocol(format!("Failed to serialize response: {e}")))
}

async fn write_line(out: &SharedWriter, line: &str) -> Result<(), SpotiqError> {
    let mut out = out.lock().await;
    out.write_all(line.as_bytes()).await?;
    out.write_all(b"\n").await?;
    out.flush().await?;
    Ok(())
}

#[derive(Debug, Default, Deserialize)]
struct InitializeParams {
    #[serde(default)]
    settings: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct ActionParams {
    command: ActionCommand,
}

fn decode_params<T: serde::de::DeserializeOwned + Default>(
    params: Option<serde_json::Value>,
) -> Result<T, SpotiqError> {
    match params {
        Some(value) => serde_json::from_value(value)
            .map_err(|e| SpotiqError::Protocol(format!("Invalid params: {e}"))),
        None => Ok(T::default()),
    }
}

/// Dispatch one host frame. Returns the response to write, or `None` for
/// notifications.
pub async fn handle_frame(plugin: &SpotifyPlugin, frame: Frame) -> Option<ResponseFrame> {
    let id = frame.id;
    let result = dispatch(plugin, &frame.method, frame.params).await;

    match (id, result) {
        (Some(id), Ok(Some(value))) => Some(ResponseFrame::result(id, value)),
        (Some(id), Ok(None)) => Some(ResponseFrame::error(
            Some(id),
            METHOD_NOT_FOUND,
            format!("Method not found: {}", frame.method),
            None,
        )),
        (Some(id), Err(e)) => {
            let code = match e {
                SpotiqError::Protocol(_) => INVALID_PARAMS,
                _ => HANDLER_ERROR,
            };
            Some(ResponseFrame::error(
                Some(id),
                code,
                e.to_string(),
                Some(serde_json::json!({ "code": e.code() })),
            ))
        }
        (None, Ok(None)) => {
            warn!(method = %frame.method, "unknown notification from host");
            None
        }
        (None, Ok(Some(_))) => None,
        (None, Err(e)) => {
            warn!(method = %frame.method, error = %e, "notification handling failed");
            None
        }
    }
}

/// Method table. `Ok(None)` means the method is unknown.
async fn dispatch(
    plugin: &SpotifyPlugin,
    method: &str,
    params: Option<serde_json::Value>,
) -> Result<Option<serde_json::Value>, SpotiqError> {
    match method {
        "initialize" => {
            let params: InitializeParams = decode_params(params)?;
            plugin.init(&params.settings).await;
            Ok(Some(serde_json::json!({
                "plugin": {
                    "name": env!("CARGO_PKG_NAME"),
                    "version": env!("CARGO_PKG_VERSION"),
                }
            })))
        }
        "query" => {
            let query: PluginQuery = decode_params(params)?;
            let items = plugin.query(&query).await;
            Ok(Some(serde_json::json!({ "items": items })))
        }
        "action" => {
            let action: ActionParams = match params {
                Some(value) => serde_json::from_value(value)
                    .map_err(|e| SpotiqError::Protocol(format!("Invalid params: {e}")))?,
                None => return Err(SpotiqError::Protocol("Missing action params".into())),
            };
            plugin.perform(&action.command).await;
            Ok(Some(serde_json::json!({})))
        }
        "deepLink" => {
            let link: DeepLink = decode_params(params)?;
            plugin.handle_deep_link(&link).await;
            Ok(Some(serde_json::json!({})))
        }
        "shutdown" => {
            plugin.shutdown();
            Ok(Some(serde_json::json!({})))
        }
        _ => Ok(None),
    }
}

/// Run the plugin against stdin/stdout until the host closes the pipe or
/// sends `shutdown`.
pub async fn serve(config: PluginConfig) -> Result<(), SpotiqError> {
    let out: SharedWriter = Arc::new(Mutex::new(BufWriter::new(tokio::io::stdout())));
    let host = Arc::new(StdioHost::new(out.clone()));
    let plugin = SpotifyPlugin::new(config, host);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let frame: Frame = match serde_json::from_str(&line) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(error = %e, "unparseable frame from host");
                let resp =
                    ResponseFrame::error(None, PARSE_ERROR, format!("Parse error: {e}"), None);
                write_line(&out, &encode(&resp)?).await?;
                continue;
            }
        };

        let stop = frame.method == "shutdown";
        if let Some(resp) = handle_frame(&plugin, frame).await {
            write_line(&out, &encode(&resp)?).await?;
        }
        if stop {
            break;
        }
    }

    plugin.shutdown();
    Ok(())
}
