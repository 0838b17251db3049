use std::fmt;

use serde_json::Value;

use crate::plugin_system::config::ConfigData;
use crate::plugin_system::error::{DefinitionError, PluginSystemError};

/// Port a proxy connector falls back to when neither its definition nor
/// the remote configuration names one.
pub const DEFAULT_PROXY_PORT: u16 = 3128;

/// The plugin type, as a tagged variant carrying kind-specific fields.
///
/// Per-kind behavior differences live in the [`validate`](PluginKind::validate)
/// and [`initialize`](PluginKind::initialize) dispatch below rather than in a
/// type hierarchy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PluginKind {
    /// Pure capability provider with no host surface of its own
    Library,
    /// Self-contained application plugin
    Application,
    /// Manages window placement for the host desktop
    WindowManager,
    /// Runs during host bring-up, before regular applications
    Bootstrap,
    /// Provides the host desktop shell
    Desktop,
    /// Contributes one authentication scheme to the host
    NodeAuthentication { auth_type: String },
    /// Bridges to a remote endpoint
    ProxyConnector {
        host: Option<String>,
        port: Option<u16>,
    },
}

impl PluginKind {
    /// Parses the declared plugin type, pulling kind-specific fields out of
    /// the definition's config block.
    pub fn parse(kind: &str, config: &Value) -> Result<Self, DefinitionError> {
        match kind {
            "library" => Ok(PluginKind::Library),
            "application" => Ok(PluginKind::Application),
            "windowManager" => Ok(PluginKind::WindowManager),
            "bootstrap" => Ok(PluginKind::Bootstrap),
            "desktop" => Ok(PluginKind::Desktop),
            "nodeAuthentication" => {
                let auth_type = config
                    .get("authType")
                    .and_then(Value::as_str)
                    .filter(|t| !t.trim().is_empty())
                    .ok_or(DefinitionError::MissingField { field: "authType" })?;
                Ok(PluginKind::NodeAuthentication {
                    auth_type: auth_type.to_string(),
                })
            }
            "proxyConnector" => {
                let host = config
                    .get("host")
                    .and_then(Value::as_str)
                    .map(str::to_string);
                let port = config
                    .get("port")
                    .and_then(Value::as_u64)
                    .and_then(|p| u16::try_from(p).ok());
                Ok(PluginKind::ProxyConnector { host, port })
            }
            other => Err(DefinitionError::UnknownPluginType {
                kind: other.to_string(),
            }),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PluginKind::Library => "library",
            PluginKind::Application => "application",
            PluginKind::WindowManager => "windowManager",
            PluginKind::Bootstrap => "bootstrap",
            PluginKind::Desktop => "desktop",
            PluginKind::NodeAuthentication { .. } => "nodeAuthentication",
            PluginKind::ProxyConnector { .. } => "proxyConnector",
        }
    }

    /// Kind-specific validation against the merged host configuration.
    ///
    /// An authentication plugin only belongs in the host when its scheme
    /// appears in the host's requested auth types.
    pub fn validate(&self, plugin_id: &str, config: &ConfigData) -> Result<(), PluginSystemError> {
        match self {
            PluginKind::NodeAuthentication { auth_type } => {
                let requested: Vec<String> = config.get_or("requestedAuthTypes", Vec::new());
                if requested.iter().any(|t| t == auth_type) {
                    Ok(())
                } else {
                    Err(PluginSystemError::InitializationError {
                        plugin_id: plugin_id.to_string(),
                        message: format!(
                            "authentication type '{}' was not requested by the host",
                            auth_type
                        ),
                    })
                }
            }
            _ => Ok(()),
        }
    }

    /// Resolves the endpoint a proxy connector should dial, falling back
    /// to the remote configuration and then to built-in defaults.
    /// Returns `None` for every other kind.
    pub fn proxy_target(&self, config: &ConfigData) -> Option<(String, u16)> {
        match self {
            PluginKind::ProxyConnector { host, port } => {
                let host = host
                    .clone()
                    .or_else(|| config.get("remoteHost"))
                    .unwrap_or_else(|| "127.0.0.1".to_string());
                let port = port
                    .or_else(|| config.get("remotePort"))
                    .unwrap_or(DEFAULT_PROXY_PORT);
                Some((host, port))
            }
            _ => None,
        }
    }

    /// Kind-specific initialization for one accepted plugin.
    pub fn initialize(
        &self,
        plugin_id: &str,
        config: &ConfigData,
    ) -> Result<(), PluginSystemError> {
        if let Some((host, port)) = self.proxy_target(config) {
            log::debug!("proxy connector '{}' targets {}:{}", plugin_id, host, port);
        } else {
            log::debug!("initialized {} plugin '{}'", self.as_str(), plugin_id);
        }
        Ok(())
    }
}

impl fmt::Display for PluginKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
