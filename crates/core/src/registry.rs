// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry: loads the capsule catalogue and orchestrator configuration
//! from a single YAML document (§4.5, §6).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::capsule::Capsule;
use crate::error::ConfigError;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DockerConfig {
    #[serde(default = "default_network")]
    pub network: String,
    #[serde(default = "default_base_path")]
    pub base_path: String,
    /// Override for the host-gateway alias a containerized capsule uses to
    /// reach back into the orchestrator. Replaces `host.docker.internal`
    /// when set (covers Linux hosts without Docker Desktop's automatic
    /// host-gateway DNS entry — see §9 of the specification).
    #[serde(default)]
    pub host_gateway: Option<String>,
}

fn default_network() -> String {
    "aod-network".to_string()
}

fn default_base_path() -> String {
    "./volumes".to_string()
}

impl Default for DockerConfig {
    fn default() -> Self {
        Self { network: default_network(), base_path: default_base_path(), host_gateway: None }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LlmConfig {
    pub api_base: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
struct CapsuleEntry {
    path: String,
    image: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
struct RawConfig {
    #[serde(default)]
    server: ServerConfig,
    #[serde(default)]
    docker: DockerConfig,
    #[serde(default)]
    llm: LlmConfig,
    #[serde(default)]
    capsules: HashMap<String, CapsuleEntry>,
}

/// The orchestrator's process-wide, read-only configuration and capsule
/// catalogue. Constructed once at startup; never re-initialized per request
/// (§9 design note).
#[derive(Debug, Clone)]
pub struct Registry {
    server: ServerConfig,
    docker: DockerConfig,
    llm: LlmConfig,
    capsules: HashMap<String, Capsule>,
}

impl Registry {
    /// Load and normalize the configuration document at `config_path`.
    ///
    /// Capsule paths and `docker.base_path` are resolved relative to the
    /// config file's own parent directory. Missing `Dockerfile` or
    /// `schema.json` on a capsule is a non-fatal warning, not a load error.
    pub fn load(config_path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
            path: config_path.display().to_string(),
            source,
        })?;
        let raw: RawConfig =
            serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
                path: config_path.display().to_string(),
                source,
            })?;

        let config_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_raw(raw, config_dir)
    }

    fn from_raw(raw: RawConfig, config_dir: &Path) -> Result<Self, ConfigError> {
        if raw.llm.api_base.as_deref().map(str::is_empty).unwrap_or(true) {
            return Err(ConfigError::MissingLlmApiBase);
        }

        let docker = DockerConfig {
            base_path: normalize_path(config_dir, &raw.docker.base_path),
            ..raw.docker
        };

        let mut capsules = HashMap::new();
        for (name, entry) in raw.capsules {
            let path = PathBuf::from(normalize_path(config_dir, &entry.path));
            if !path.exists() {
                warn!(capsule = %name, path = %path.display(), "capsule path does not exist");
            } else {
                if !path.join("Dockerfile").exists() {
                    warn!(capsule = %name, "Dockerfile not found");
                }
                if !path.join("schema.json").exists() {
                    warn!(capsule = %name, "schema.json not found");
                }
            }
            capsules.insert(name.clone(), Capsule::new(name, entry.image, path));
        }

        Ok(Self { server: raw.server, docker, llm: raw.llm, capsules })
    }

    pub fn server(&self) -> &ServerConfig {
        &self.server
    }

    pub fn docker(&self) -> &DockerConfig {
        &self.docker
    }

    pub fn capsules(&self) -> &HashMap<String, Capsule> {
        &self.capsules
    }

    pub fn capsule(&self, name: &str) -> Option<&Capsule> {
        self.capsules.get(name)
    }

    /// The URL a *containerized capsule* must use to call back into the
    /// orchestrator. Binding to `0.0.0.0` and advertising the bind address
    /// back to a container does not work, so this resolves to the
    /// host-gateway alias instead (§4.5, §9).
    pub fn orchestrator_url(&self) -> String {
        if self.server.host == "0.0.0.0" {
            let gateway =
                self.docker.host_gateway.as_deref().unwrap_or("host.docker.internal");
            format!("http://{}:{}", gateway, self.server.port)
        } else {
            format!("http://{}:{}", self.server.host, self.server.port)
        }
    }

    /// The LLM API base URL every capsule receives via
    /// `OPENAI_API_BASE`/`LITELLM_API_BASE`.
    pub fn llm_api_base(&self) -> &str {
        // Validated non-empty in `load`.
        self.llm.api_base.as_deref().unwrap_or_default()
    }

    /// Resolve the API key a capsule should present to the LLM backend.
    ///
    /// Precedence: `OPENAI_API_KEY` env var, then config, then the literal
    /// placeholder `"dummy"` — never empty, so clients that reject empty
    /// credentials still work against a local proxy that ignores the key.
    pub fn llm_api_key(&self) -> String {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                return key;
            }
        }
        match &self.llm.api_key {
            Some(key) if !key.is_empty() => key.clone(),
            _ => "dummy".to_string(),
        }
    }

    /// Build a `Registry` directly from an already-resolved capsule set,
    /// bypassing config-file loading. For use by other crates' test suites.
    #[cfg(any(test, feature = "test-support"))]
    pub fn test_with_capsules(capsules: HashMap<String, Capsule>) -> Self {
        Self {
            server: ServerConfig::default(),
            docker: DockerConfig::default(),
            llm: LlmConfig { api_base: Some("http://localhost:4000".to_string()), api_key: None },
            capsules,
        }
    }
}

fn normalize_path(base: &Path, raw: &str) -> String {
    let candidate = Path::new(raw);
    let resolved =
        if candidate.is_absolute() { candidate.to_path_buf() } else { base.join(candidate) };
    resolved.to_string_lossy().into_owned()
}

#[cfg(test)]
mod registry_tests;
