//! 本地目录数据源：`<assets_dir>/<chapter>/<page>`。

use std::fs;
use std::path::PathBuf;

use super::index::PageReference;
use super::lister::{FolderEntry, FolderLister, ListError};

/// 静态资源挂载前缀，与 web 层的 `/assets/*path` 路由对应。
pub(crate) const ASSETS_MOUNT: &str = "/assets";

pub(crate) struct LocalFolderLister {
    root_dir: PathBuf,
}

impl LocalFolderLister {
    pub(crate) fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn resolve(&self, folder: &str) -> PathBuf {
        if folder.is_empty() {
            self.root_dir.clone()
        } else {
            self.root_dir.join(folder)
        }
    }
}

impl FolderLister for LocalFolderLister {
    fn root(&self) -> &str {
        ""
    }

    /// 根目录只列出章节文件夹，章节内只列出普通文件；符号链接按目标类型判断。
    fn list_children(&self, folder: &str) -> Result<Vec<FolderEntry>, ListError> {
        let dir = self.resolve(folder);
        let want_dirs = folder.is_empty();
        let read = fs::read_dir(&dir).map_err(|source| ListError::Io {
            path: dir.clone(),
            source,
        })?;

        let mut out = Vec::new();
        for item in read {
            let item = item.map_err(|source| ListError::Io {
                path: dir.clone(),
                source,
            })?;
            let name = item.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                continue;
            }
            let Ok(meta) = fs::metadata(item.path()) else {
                continue;
            };
            if (want_dirs && !meta.is_dir()) || (!want_dirs && !meta.is_file()) {
                continue;
            }
            let id = join_id(folder, &name);
            out.push(FolderEntry::new(name, id));
        }
        Ok(out)
    }

    fn page_reference(&self, page: &FolderEntry) -> PageReference {
        let mut out = String::from(ASSETS_MOUNT);
        for segment in page.id.split('/') {
            out.push('/');
            encode_segment(segment, &mut out);
        }
        PageReference::new(out)
    }

    fn describe(&self) -> String {
        format!("local:{}", self.root_dir.display())
    }
}

fn join_id(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

/// 路径段百分号编码：只保留 RFC 3986 的非保留字符。
fn encode_segment(segment: &str, out: &mut String) {
    fn is_unreserved(b: u8) -> bool {
        b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
    }
    for &b in segment.as_bytes() {
        if is_unreserved(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn lists_direct_children_and_skips_hidden() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("vol_c01")).unwrap();
        fs::write(dir.path().join("vol_c01").join("001.png"), b"x").unwrap();
        fs::write(dir.path().join(".DS_Store"), b"x").unwrap();

        let lister = LocalFolderLister::new(dir.path());
        let root = lister.list_children(lister.root()).unwrap();
        assert_eq!(root, vec![FolderEntry::new("vol_c01", "vol_c01")]);

        let pages = lister.list_children(&root[0].id).unwrap();
        assert_eq!(pages, vec![FolderEntry::new("001.png", "vol_c01/001.png")]);
        assert_eq!(
            lister.page_reference(&pages[0]).as_str(),
            "/assets/vol_c01/001.png"
        );
    }

    #[test]
    fn chapters_list_only_files_and_root_only_folders() {
        let dir = TempDir::new().unwrap();
        let chapter = dir.path().join("vol_c01");
        fs::create_dir_all(chapter.join("extras")).unwrap();
        fs::write(chapter.join("001.png"), b"x").unwrap();
        fs::write(dir.path().join("notes_c9.txt"), b"x").unwrap();

        let lister = LocalFolderLister::new(dir.path());
        assert_eq!(
            lister.list_children("").unwrap(),
            vec![FolderEntry::new("vol_c01", "vol_c01")]
        );
        assert_eq!(
            lister.list_children("vol_c01").unwrap(),
            vec![FolderEntry::new("001.png", "vol_c01/001.png")]
        );
    }

    #[test]
    fn references_escape_reserved_characters() {
        let lister = LocalFolderLister::new("/unused");
        let hash = FolderEntry::new("a#1.png", "vol_c01/a#1.png");
        let percent = FolderEntry::new("100%.png", "vol_c01/100%.png");
        let spaced = FolderEntry::new("p 2?.png", "第1话_c01/p 2?.png");

        assert_eq!(
            lister.page_reference(&hash).as_str(),
            "/assets/vol_c01/a%231.png"
        );
        assert_eq!(
            lister.page_reference(&percent).as_str(),
            "/assets/vol_c01/100%25.png"
        );
        assert_eq!(
            lister.page_reference(&spaced).as_str(),
            "/assets/%E7%AC%AC1%E8%AF%9D_c01/p%202%3F.png"
        );
    }

    #[test]
    fn missing_folder_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let lister = LocalFolderLister::new(dir.path().join("nope"));
        assert!(matches!(
            lister.list_children(""),
            Err(ListError::Io { .. })
        ));
    }
}
