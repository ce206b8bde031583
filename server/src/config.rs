//! 服务端配置
//!
//! 查找顺序：命令行第一个参数 → 环境变量 `XIANGQI_SERVER_CONFIG` →
//! `<配置目录>/xiangqi-server/config.json`（存在时）→ 默认值。

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use xiangqi_protocol::RulesConfig;

/// 配置文件路径环境变量
pub const CONFIG_ENV: &str = "XIANGQI_SERVER_CONFIG";

/// 默认日志过滤
const DEFAULT_LOG_FILTER: &str = "xiangqi_server=info";

/// 房间事件通道默认容量
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// 服务端配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 走法规则开关
    pub rules: RulesConfig,
    /// 是否把被拒绝的事件告知客户端
    pub report_rejections: bool,
    /// 每个房间事件通道的容量
    pub room_channel_capacity: usize,
    /// 未设置 RUST_LOG 时使用的日志过滤
    pub log_filter: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            rules: RulesConfig::default(),
            report_rejections: false,
            room_channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl ServerConfig {
    /// 从 JSON 文件加载
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {:?}", path))?;

        let config: ServerConfig = serde_json::from_str(&content)
            .with_context(|| format!("解析配置文件失败: {:?}", path))?;

        anyhow::ensure!(
            config.room_channel_capacity > 0,
            "room_channel_capacity 必须大于 0"
        );
        Ok(config)
    }

    /// 按查找顺序加载配置
    pub fn load(cli_path: Option<PathBuf>) -> Result<Self> {
        let explicit = cli_path.or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        if let Some(path) = explicit {
            return Self::from_file(&path);
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// 默认配置文件位置
fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("xiangqi-server").join("config.json"))
}
