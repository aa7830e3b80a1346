//! 目录列举抽象：本地磁盘与远程文件托管服务共用同一个接口。

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::index::PageReference;

/// 某个文件夹下的一个直接子项（章节文件夹或页面文件）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FolderEntry {
    pub(crate) name: String,
    /// 数据源内部的句柄：本地为相对路径，远程为文件 id。
    pub(crate) id: String,
}

impl FolderEntry {
    pub(crate) fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ListError {
    #[error("io error at {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
    #[error("http error: {0}")]
    Http(reqwest::Error),
    #[error("api returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("listing unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for ListError {
    /// 去掉 URL，避免查询参数进入日志。
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.without_url())
    }
}

/// 只读地列出文件夹的直接子项，不保证顺序。
pub(crate) trait FolderLister {
    /// 漫画根文件夹的句柄。
    fn root(&self) -> &str;

    fn list_children(&self, folder: &str) -> Result<Vec<FolderEntry>, ListError>;

    /// 把章节内的页面项转换成前端可直接使用的引用。
    fn page_reference(&self, page: &FolderEntry) -> PageReference;

    fn describe(&self) -> String;
}
