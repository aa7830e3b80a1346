//! 上次阅读页码的持久化：一个只保存十进制页码的小文本文件。
//!
//! 该值只作参考，边界检查始终以页面索引为准。

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct PageStateStore {
    path: PathBuf,
}

impl PageStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 文件不存在或内容损坏都视为「没有记录」。
    pub fn load(&self) -> Option<i64> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                if err.kind() != io::ErrorKind::NotFound {
                    warn!(target: "state", path = %self.path.display(), error = %err, "failed to read page state");
                }
                return None;
            }
        };
        match raw.trim().parse::<i64>() {
            Ok(page) => Some(page),
            Err(_) => {
                warn!(target: "state", path = %self.path.display(), "ignoring corrupt page state");
                None
            }
        }
    }

    pub fn save(&self, page: i64) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, page.to_string())
    }

    /// 脱离请求路径写入，失败只记日志。并发写入以最后落盘的一次为准。
    pub fn save_detached(&self, page: i64) {
        let store = self.clone();
        tokio::task::spawn_blocking(move || match store.save(page) {
            Ok(()) => debug!(target: "state", page, "page state saved"),
            Err(err) => {
                warn!(target: "state", path = %store.path.display(), error = %err, "failed to write page state")
            }
        });
    }
}
