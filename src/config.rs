//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `HIVE__*` 覆盖（双下划线表示嵌套，
//! 如 `HIVE__MESH__ENDPOINT=http://dial:8080`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub mesh: MeshSection,
    #[serde(default)]
    pub tools: ToolsSection,
}

/// [app] 段：应用名
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [mesh] 段：统一协议端点、API 版本与超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeshSection {
    /// 网格端点（所有部署共用同一端点，按部署名路由）
    pub endpoint: String,
    /// 每次调用固定携带的 api-version
    pub api_version: String,
    #[serde(default)]
    pub timeouts: MeshTimeoutsSection,
}

impl Default for MeshSection {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            timeouts: MeshTimeoutsSection::default(),
        }
    }
}

fn default_endpoint() -> String {
    "http://localhost:8080".to_string()
}

fn default_api_version() -> String {
    "2025-01-01-preview".to_string()
}

/// [mesh.timeouts] 段：连接与整次流式读取的超时（秒）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MeshTimeoutsSection {
    #[serde(default = "default_request_timeout")]
    pub request: u64,
    #[serde(default = "default_stream_timeout")]
    pub stream: u64,
}

impl Default for MeshTimeoutsSection {
    fn default() -> Self {
        Self {
            request: default_request_timeout(),
            stream: default_stream_timeout(),
        }
    }
}

fn default_request_timeout() -> u64 {
    60
}

fn default_stream_timeout() -> u64 {
    120
}

/// [tools] 段：单次工具调用超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ToolsSection {
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

fn default_tool_timeout_secs() -> u64 {
    300
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            mesh: MeshSection::default(),
            tools: ToolsSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 HIVE__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 HIVE__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("HIVE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

/// 重新从磁盘与环境变量加载配置（配置热更新：调用方决定是否用新配置重建后端等组件）
pub fn reload_config() -> Result<AppConfig, config::ConfigError> {
    load_config(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.mesh.endpoint, "http://localhost:8080");
        assert_eq!(cfg.mesh.api_version, "2025-01-01-preview");
        assert_eq!(cfg.mesh.timeouts.request, 60);
        assert_eq!(cfg.mesh.timeouts.stream, 120);
        assert_eq!(cfg.tools.tool_timeout_secs, 300);
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hive.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[mesh]\nendpoint = \"http://dial:9000\"\n\n[mesh.timeouts]\nstream = 300\n"
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.mesh.endpoint, "http://dial:9000");
        assert_eq!(cfg.mesh.timeouts.stream, 300);
        // 未覆盖的键保持默认
        assert_eq!(cfg.mesh.api_version, "2025-01-01-preview");
    }
}
