//! 页面索引：把「章节文件夹 → 页面文件」两级结构压平成一个有序序列。

use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::lister::{FolderLister, ListError};
use super::ordering::{ChapterOrder, sort_chapters, sort_pages};

/// 单张图片的定位：本地静态路径或完整的下载 URL。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct PageReference(Arc<str>);

impl PageReference {
    pub(crate) fn new(raw: impl Into<Arc<str>>) -> Self {
        Self(raw.into())
    }

    pub(crate) fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 构建完成后只读，克隆只增加引用计数。
#[derive(Debug, Clone, Default)]
pub(crate) struct PageIndex {
    pages: Arc<[PageReference]>,
}

impl PageIndex {
    pub(crate) fn new(pages: Vec<PageReference>) -> Self {
        Self {
            pages: pages.into(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.pages.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// 0 起始下标。
    pub(crate) fn get(&self, idx: usize) -> Option<&PageReference> {
        self.pages.get(idx)
    }
}

#[derive(Debug, Error)]
pub(crate) enum IndexError {
    #[error("failed to list comic root '{root}': {source}")]
    RootListing { root: String, source: ListError },
    #[error("chapter folder '{name}' has no ordering marker '{marker}'")]
    MissingMarker { name: String, marker: String },
}

#[derive(Debug, Clone)]
pub(crate) struct ChapterProgress {
    /// 1 起始。
    pub(crate) current: usize,
    pub(crate) total: usize,
    pub(crate) name: String,
    pub(crate) pages: Option<usize>,
}

#[derive(Debug, Clone)]
pub(crate) struct BuildOptions {
    pub(crate) chapter_marker: String,
    pub(crate) chapter_order: ChapterOrder,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            chapter_marker: super::ordering::DEFAULT_CHAPTER_MARKER.to_string(),
            chapter_order: ChapterOrder::Lexical,
        }
    }
}

pub(crate) struct PageIndexBuilder<'a, L: FolderLister + ?Sized> {
    lister: &'a L,
    options: BuildOptions,
    progress: Option<Box<dyn FnMut(ChapterProgress) + 'a>>,
}

impl<'a, L: FolderLister + ?Sized> PageIndexBuilder<'a, L> {
    pub(crate) fn new(lister: &'a L, options: BuildOptions) -> Self {
        Self {
            lister,
            options,
            progress: None,
        }
    }

    pub(crate) fn on_progress(mut self, f: impl FnMut(ChapterProgress) + 'a) -> Self {
        self.progress = Some(Box::new(f));
        self
    }

    /// 只有根目录列举失败或章节名缺少标记是致命的；
    /// 单个章节列举失败时跳过，不贡献任何页面。
    pub(crate) fn build(mut self) -> Result<PageIndex, IndexError> {
        let root = self.lister.root().to_string();
        let mut chapters =
            self.lister
                .list_children(&root)
                .map_err(|source| IndexError::RootListing {
                    root: root.clone(),
                    source,
                })?;

        let marker = self.options.chapter_marker.clone();
        sort_chapters(&mut chapters, &marker, self.options.chapter_order).map_err(|e| {
            IndexError::MissingMarker {
                name: e.name,
                marker: marker.clone(),
            }
        })?;

        let total = chapters.len();
        info!(target: "index", source = %self.lister.describe(), chapters = total, "building page index");

        let mut pages_out = Vec::new();
        let mut skipped = 0usize;
        for (i, chapter) in chapters.iter().enumerate() {
            info!(target: "index", "reading chapter ({}/{}) {}", i + 1, total, chapter.name);

            let count = match self.lister.list_children(&chapter.id) {
                Ok(mut pages) => {
                    sort_pages(&mut pages);
                    let n = pages.len();
                    pages_out.extend(
                        pages
                            .iter()
                            .map(|page| self.lister.page_reference(page)),
                    );
                    Some(n)
                }
                Err(err) => {
                    warn!(target: "index", chapter = %chapter.name, error = %err, "chapter skipped");
                    skipped += 1;
                    None
                }
            };

            if let Some(cb) = self.progress.as_mut() {
                cb(ChapterProgress {
                    current: i + 1,
                    total,
                    name: chapter.name.clone(),
                    pages: count,
                });
            }
        }

        info!(
            target: "index",
            pages = pages_out.len(),
            chapters = total,
            skipped,
            "page index ready"
        );
        Ok(PageIndex::new(pages_out))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::library::lister::FolderEntry;

    /// 内存数据源：文件夹 id → 子项；`None` 表示该文件夹列举失败。
    struct MemoryLister {
        folders: HashMap<String, Option<Vec<FolderEntry>>>,
    }

    impl MemoryLister {
        fn comic(chapters: &[(&str, Option<Vec<&str>>)]) -> Self {
            let mut folders = HashMap::new();
            let mut root = Vec::new();
            for (name, pages) in chapters {
                root.push(FolderEntry::new(*name, *name));
                let pages = pages.as_ref().map(|pages| {
                    pages
                        .iter()
                        .map(|p| FolderEntry::new(*p, format!("{name}/{p}")))
                        .collect()
                });
                folders.insert(name.to_string(), pages);
            }
            folders.insert("root".to_string(), Some(root));
            Self { folders }
        }
    }

    impl FolderLister for MemoryLister {
        fn root(&self) -> &str {
            "root"
        }

        fn list_children(&self, folder: &str) -> Result<Vec<FolderEntry>, ListError> {
            match self.folders.get(folder) {
                Some(Some(entries)) => Ok(entries.clone()),
                _ => Err(ListError::Unavailable(folder.to_string())),
            }
        }

        fn page_reference(&self, page: &FolderEntry) -> PageReference {
            PageReference::new(page.id.as_str())
        }

        fn describe(&self) -> String {
            "memory".to_string()
        }
    }

    fn refs(index: &PageIndex) -> Vec<&str> {
        (0..index.len())
            .filter_map(|i| index.get(i))
            .map(|r| r.as_str())
            .collect()
    }

    #[test]
    fn flattens_chapters_then_pages() {
        let lister = MemoryLister::comic(&[
            ("c_02", Some(vec!["b.png", "a.png"])),
            ("c_01", Some(vec!["x.png"])),
        ]);
        let options = BuildOptions {
            chapter_marker: "_".to_string(),
            ..BuildOptions::default()
        };
        let index = PageIndexBuilder::new(&lister, options).build().unwrap();
        assert_eq!(refs(&index), vec!["c_01/x.png", "c_02/a.png", "c_02/b.png"]);
    }

    #[test]
    fn order_does_not_depend_on_listing_order() {
        let forward = MemoryLister::comic(&[
            ("v_c01", Some(vec!["1.png", "2.png"])),
            ("v_c02", Some(vec!["1.png"])),
        ]);
        let backward = MemoryLister::comic(&[
            ("v_c02", Some(vec!["1.png"])),
            ("v_c01", Some(vec!["2.png", "1.png"])),
        ]);
        let a = PageIndexBuilder::new(&forward, BuildOptions::default())
            .build()
            .unwrap();
        let b = PageIndexBuilder::new(&backward, BuildOptions::default())
            .build()
            .unwrap();
        assert_eq!(refs(&a), refs(&b));
    }

    #[test]
    fn failed_chapter_contributes_nothing() {
        let lister = MemoryLister::comic(&[
            ("s_c03", Some(vec!["p1.png"])),
            ("s_c02", None),
            ("s_c01", Some(vec!["p2.png", "p1.png"])),
        ]);
        let mut seen = Vec::new();
        let index = PageIndexBuilder::new(&lister, BuildOptions::default())
            .on_progress(|p| seen.push((p.current, p.total, p.name, p.pages)))
            .build()
            .unwrap();

        assert_eq!(
            refs(&index),
            vec!["s_c01/p1.png", "s_c01/p2.png", "s_c03/p1.png"]
        );
        assert_eq!(
            seen,
            vec![
                (1, 3, "s_c01".to_string(), Some(2)),
                (2, 3, "s_c02".to_string(), None),
                (3, 3, "s_c03".to_string(), Some(1)),
            ]
        );
    }

    #[test]
    fn root_failure_is_fatal() {
        let lister = MemoryLister {
            folders: HashMap::new(),
        };
        let err = PageIndexBuilder::new(&lister, BuildOptions::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, IndexError::RootListing { .. }));
    }

    #[test]
    fn chapter_without_marker_is_fatal() {
        let lister = MemoryLister::comic(&[("ok_c01", Some(vec!["a.png"])), ("bonus", Some(vec![]))]);
        let err = PageIndexBuilder::new(&lister, BuildOptions::default())
            .build()
            .unwrap_err();
        match err {
            IndexError::MissingMarker { name, marker } => {
                assert_eq!(name, "bonus");
                assert_eq!(marker, "_c");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_root_builds_empty_index() {
        let lister = MemoryLister::comic(&[]);
        let index = PageIndexBuilder::new(&lister, BuildOptions::default())
            .build()
            .unwrap();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
    }
}
