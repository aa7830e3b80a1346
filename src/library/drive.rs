//! 远程数据源：Google Drive v3 `files.list`，按 `'<id>' in parents` 只列直接子项。

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, HeaderMap, HeaderName, HeaderValue};
use serde::Deserialize;
use tracing::debug;

use super::index::PageReference;
use super::lister::{FolderEntry, FolderLister, ListError};

const FILES_ENDPOINT: &str = "https://www.googleapis.com/drive/v3/files";
const DOWNLOAD_PREFIX: &str = "https://lh3.googleusercontent.com/d/";
const FIELDS: &str = "nextPageToken, files(id, name)";
const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-goog-api-key");
/// 单个文件夹最多翻多少页，防止服务端返回重复的 token 导致死循环。
const MAX_CONTINUATIONS: usize = 100;

#[derive(Debug, Clone)]
pub(crate) struct DriveConfig {
    pub(crate) api_key: String,
    pub(crate) root_folder_id: String,
    pub(crate) page_size: u32,
    pub(crate) request_timeout: Duration,
    pub(crate) endpoint: String,
}

impl DriveConfig {
    pub(crate) fn new(api_key: String, root_folder_id: String) -> Self {
        Self {
            api_key,
            root_folder_id,
            page_size: 200,
            request_timeout: Duration::from_secs(15),
            endpoint: FILES_ENDPOINT.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    #[serde(default)]
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Debug, Deserialize)]
struct DriveFile {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    #[serde(default)]
    message: String,
}

pub(crate) struct DriveFolderLister {
    client: Client,
    config: DriveConfig,
}

impl DriveFolderLister {
    pub(crate) fn new(config: DriveConfig) -> anyhow::Result<Self> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // key 放在请求头里，不出现在 URL 上。
        if !config.api_key.is_empty() {
            let mut key = HeaderValue::from_str(&config.api_key)?;
            key.set_sensitive(true);
            default_headers.insert(API_KEY_HEADER, key);
        }

        // 没有超时的话，一个挂起的请求会让服务永远无法就绪。
        let client = Client::builder()
            .default_headers(default_headers)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { client, config })
    }

    fn fetch_page(&self, folder: &str, page_token: Option<&str>) -> Result<FileList, ListError> {
        let query = parents_query(folder);
        let page_size = self.config.page_size.to_string();
        let mut params: Vec<(&str, &str)> = vec![
            ("q", query.as_str()),
            ("fields", FIELDS),
            ("pageSize", page_size.as_str()),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        debug!(target: "index", folder = %folder, token = ?page_token, "files.list");
        let resp = self
            .client
            .get(&self.config.endpoint)
            .query(&params)
            .send()?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(ListError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json::<FileList>()?)
    }
}

impl FolderLister for DriveFolderLister {
    fn root(&self) -> &str {
        &self.config.root_folder_id
    }

    fn list_children(&self, folder: &str) -> Result<Vec<FolderEntry>, ListError> {
        let mut out = Vec::new();
        let mut token: Option<String> = None;

        for _ in 0..MAX_CONTINUATIONS {
            let page = self.fetch_page(folder, token.as_deref())?;
            out.extend(
                page.files
                    .into_iter()
                    .map(|f| FolderEntry::new(f.name, f.id)),
            );
            match page.next_page_token {
                Some(next) if !next.is_empty() && Some(&next) != token.as_ref() => {
                    token = Some(next);
                }
                _ => return Ok(out),
            }
        }

        Err(ListError::Unavailable(format!(
            "folder {folder} did not finish after {MAX_CONTINUATIONS} pages"
        )))
    }

    fn page_reference(&self, page: &FolderEntry) -> PageReference {
        PageReference::new(format!("{DOWNLOAD_PREFIX}{}", page.id))
    }

    fn describe(&self) -> String {
        format!("drive:{}", self.config.root_folder_id)
    }
}

fn parents_query(folder: &str) -> String {
    // Drive 查询字符串里的单引号和反斜杠需要转义。
    let escaped = folder.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{escaped}' in parents")
}
