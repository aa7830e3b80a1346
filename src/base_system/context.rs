//! 全局配置结构（Config）与默认值。
//!
//! 该模块同时提供生成 `config.yml` 的字段元信息，以及环境变量覆盖。

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::config::{ConfigError, ConfigSpec, FieldMeta};
use crate::library::ordering::{ChapterOrder, DEFAULT_CHAPTER_MARKER};

pub const ENV_FETCH_FROM_DRIVE: &str = "FETCH_FROM_GOOGLE_DRIVE";
pub const ENV_DRIVE_API_KEY: &str = "GOOGLE_DRIVE_API_KEY";
pub const ENV_PORT: &str = "PORT";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Local,
    Drive,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // 数据源
    #[serde(default)]
    pub source: SourceKind,
    #[serde(default = "default_assets_dir")]
    pub assets_dir: String,
    #[serde(default = "default_drive_folder_id")]
    pub drive_folder_id: String,
    #[serde(default)]
    pub drive_api_key: String,
    #[serde(default = "default_drive_page_size")]
    pub drive_page_size: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,

    // 排序
    #[serde(default = "default_chapter_marker")]
    pub chapter_marker: String,
    #[serde(default)]
    pub chapter_order: ChapterOrder,

    // 服务
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            assets_dir: default_assets_dir(),
            drive_folder_id: default_drive_folder_id(),
            drive_api_key: String::new(),
            drive_page_size: default_drive_page_size(),
            request_timeout: default_request_timeout(),
            chapter_marker: default_chapter_marker(),
            chapter_order: ChapterOrder::default(),
            bind_addr: default_bind_addr(),
            state_file: default_state_file(),
        }
    }
}

impl ConfigSpec for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldMeta] {
        static FIELDS: [FieldMeta; 10] = [
            FieldMeta {
                name: "source",
                description: "漫画数据源 (local/drive)，环境变量 FETCH_FROM_GOOGLE_DRIVE 非空时强制为 drive",
            },
            FieldMeta {
                name: "assets_dir",
                description: "本地漫画根目录，结构为 <章节文件夹>/<页面文件>",
            },
            FieldMeta {
                name: "drive_folder_id",
                description: "Google Drive 上漫画根文件夹的 id",
            },
            FieldMeta {
                name: "drive_api_key",
                description: "Google Drive API Key，可由环境变量 GOOGLE_DRIVE_API_KEY 覆盖",
            },
            FieldMeta {
                name: "drive_page_size",
                description: "单次列举请求最多返回的条目数 (1-1000)",
            },
            FieldMeta {
                name: "request_timeout",
                description: "远程列举请求超时时间（秒），超时视为失败",
            },
            FieldMeta {
                name: "chapter_marker",
                description: "章节文件夹名中的排序标记，标记之后的部分作为排序键",
            },
            FieldMeta {
                name: "chapter_order",
                description: "章节排序方式 (lexical: 字符串比较，需补零; numeric: 按数字比较)",
            },
            FieldMeta {
                name: "bind_addr",
                description: "监听地址，环境变量 PORT 可覆盖端口",
            },
            FieldMeta {
                name: "state_file",
                description: "保存上次阅读页码的文件（相对路径基于数据目录）",
            },
        ];
        &FIELDS
    }
}

impl Config {
    /// 按进程环境覆盖配置；`lookup` 便于测试注入。
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if lookup(ENV_FETCH_FROM_DRIVE).is_some_and(|v| !v.is_empty()) {
            self.source = SourceKind::Drive;
        }
        if let Some(key) = lookup(ENV_DRIVE_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.drive_api_key = key.trim().to_string();
        }
        if let Some(port) = lookup(ENV_PORT).filter(|v| !v.trim().is_empty()) {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Validation(format!("invalid {ENV_PORT}: '{port}'")))?;
            let mut addr = self.socket_addr()?;
            addr.set_port(port);
            self.bind_addr = addr.to_string();
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;
        if self.chapter_marker.is_empty() {
            return Err(ConfigError::Validation(
                "chapter_marker must not be empty".to_string(),
            ));
        }
        if self.request_timeout == 0 {
            return Err(ConfigError::Validation(
                "request_timeout must be at least 1 second".to_string(),
            ));
        }
        if self.source == SourceKind::Drive {
            if !(1..=1000).contains(&self.drive_page_size) {
                return Err(ConfigError::Validation(format!(
                    "drive_page_size must be within 1..=1000, got {}",
                    self.drive_page_size
                )));
            }
            if self.drive_api_key.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "drive source needs an API key (config drive_api_key or {ENV_DRIVE_API_KEY})"
                )));
            }
            if self.drive_folder_id.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "drive source needs drive_folder_id".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr.trim().parse().map_err(|_| {
            ConfigError::Validation(format!(
                "invalid bind_addr: '{}'. Use '0.0.0.0:8082' or '[::]:8082'",
                self.bind_addr
            ))
        })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    pub fn assets_path(&self, base_dir: Option<&Path>) -> PathBuf {
        resolve_under(&self.assets_dir, base_dir)
    }

    pub fn state_path(&self, base_dir: Option<&Path>) -> PathBuf {
        resolve_under(&self.state_file, base_dir)
    }
}

fn resolve_under(raw: &str, base_dir: Option<&Path>) -> PathBuf {
    let p = PathBuf::from(raw);
    match base_dir {
        Some(base) if p.is_relative() => base.join(p),
        _ => p,
    }
}

fn default_assets_dir() -> String {
    "assets".to_string()
}

fn default_drive_folder_id() -> String {
    "1V2N5gch1yRsFAwZ8ndtPTVoZSmYypUNT".to_string()
}

fn default_drive_page_size() -> u32 {
    200
}

fn default_request_timeout() -> u64 {
    15
}

fn default_chapter_marker() -> String {
    DEFAULT_CHAPTER_MARKER.to_string()
}

fn default_bind_addr() -> String {
    "0.0.0.0:8082".to_string()
}

fn default_state_file() -> String {
    "page".to_string()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_are_valid_for_local_source() {
        let cfg = Config::default();
        assert_eq!(cfg.source, SourceKind::Local);
        cfg.validate().unwrap();
        assert_eq!(cfg.socket_addr().unwrap().port(), 8082);
    }

    #[test]
    fn env_switches_to_drive_and_overrides_port() {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[
            (ENV_FETCH_FROM_DRIVE, "1"),
            (ENV_DRIVE_API_KEY, " secret "),
            (ENV_PORT, "9000"),
        ]))
        .unwrap();
        assert_eq!(cfg.source, SourceKind::Drive);
        assert_eq!(cfg.drive_api_key, "secret");
        assert_eq!(cfg.bind_addr, "0.0.0.0:9000");
        cfg.validate().unwrap();
    }

    #[test]
    fn empty_drive_flag_keeps_local() {
        let mut cfg = Config::default();
        cfg.apply_env(env(&[(ENV_FETCH_FROM_DRIVE, "")])).unwrap();
        assert_eq!(cfg.source, SourceKind::Local);
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut cfg = Config::default();
        let err = cfg.apply_env(env(&[(ENV_PORT, "eighty")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn drive_without_key_is_invalid() {
        let cfg = Config {
            source: SourceKind::Drive,
            ..Config::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn relative_paths_follow_data_dir() {
        let cfg = Config::default();
        let base = Path::new("/data");
        assert_eq!(cfg.state_path(Some(base)), PathBuf::from("/data/page"));
        assert_eq!(cfg.assets_path(None), PathBuf::from("assets"));
    }
}
