//! 章节与页面的排序规则。

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::lister::FolderEntry;

pub const DEFAULT_CHAPTER_MARKER: &str = "_c";

/// 章节键的比较方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterOrder {
    /// 按提取出的键做字符串比较，需要数据源补零（`_c02` 而不是 `_c2`）。
    #[default]
    Lexical,
    /// 比较键开头的十进制数字；没有数字或数字相同时退回字符串比较。
    Numeric,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MissingMarker {
    pub(crate) name: String,
}

/// 取 `marker` 第一次出现之后的全部内容作为排序键。
pub(crate) fn chapter_key<'a>(name: &'a str, marker: &str) -> Option<&'a str> {
    if marker.is_empty() {
        return None;
    }
    name.split_once(marker).map(|(_, key)| key)
}

/// 稳定排序：键相同的章节保持数据源返回的相对顺序。
///
/// 任意一个章节名缺少标记都视为数据错误，整体失败。
pub(crate) fn sort_chapters(
    chapters: &mut Vec<FolderEntry>,
    marker: &str,
    order: ChapterOrder,
) -> Result<(), MissingMarker> {
    let mut keyed = Vec::with_capacity(chapters.len());
    for entry in chapters.drain(..) {
        let Some(key) = chapter_key(&entry.name, marker) else {
            return Err(MissingMarker { name: entry.name });
        };
        let key = key.to_string();
        keyed.push((key, entry));
    }

    keyed.sort_by(|(a, _), (b, _)| compare_keys(a, b, order));
    chapters.extend(keyed.into_iter().map(|(_, entry)| entry));
    Ok(())
}

fn compare_keys(a: &str, b: &str, order: ChapterOrder) -> Ordering {
    match order {
        ChapterOrder::Lexical => a.cmp(b),
        ChapterOrder::Numeric => match (leading_number(a), leading_number(b)) {
            (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.cmp(b),
        },
    }
}

fn leading_number(key: &str) -> Option<u128> {
    let end = key
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(key.len());
    key[..end].parse().ok()
}

/// 章节内按文件名字节序升序。
pub(crate) fn sort_pages(pages: &mut [FolderEntry]) {
    pages.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<FolderEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| FolderEntry::new(*n, format!("id{i}")))
            .collect()
    }

    fn names(entries: &[FolderEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn key_is_everything_after_first_marker() {
        assert_eq!(chapter_key("one_piece_c012", "_c"), Some("012"));
        assert_eq!(chapter_key("a_c01_c2", "_c"), Some("01_c2"));
        assert_eq!(chapter_key("chapter12", "_c"), None);
        assert_eq!(chapter_key("x_c3", ""), None);
    }

    #[test]
    fn lexical_order_follows_string_keys() {
        let mut chapters = entries(&["b_c10", "a_c02", "z_c1", "m_c09"]);
        sort_chapters(&mut chapters, "_c", ChapterOrder::Lexical).unwrap();
        // "02" < "09" < "1" < "10"
        assert_eq!(names(&chapters), vec!["a_c02", "m_c09", "z_c1", "b_c10"]);
    }

    #[test]
    fn duplicate_keys_keep_source_order() {
        let mut chapters = entries(&["second_c01", "x_c00", "first_c01"]);
        sort_chapters(&mut chapters, "_c", ChapterOrder::Lexical).unwrap();
        assert_eq!(names(&chapters), vec!["x_c00", "second_c01", "first_c01"]);
        assert_eq!(chapters[1].id, "id0");
    }

    #[test]
    fn numeric_order_ignores_padding() {
        let mut chapters = entries(&["b_c10", "a_c2", "c_c1", "d_cextra"]);
        sort_chapters(&mut chapters, "_c", ChapterOrder::Numeric).unwrap();
        assert_eq!(names(&chapters), vec!["c_c1", "a_c2", "b_c10", "d_cextra"]);
    }

    #[test]
    fn missing_marker_fails_whole_sort() {
        let mut chapters = entries(&["ok_c01", "extras"]);
        let err = sort_chapters(&mut chapters, "_c", ChapterOrder::Lexical).unwrap_err();
        assert_eq!(err.name, "extras");
    }

    #[test]
    fn pages_sort_bytewise() {
        let mut pages = entries(&["b.png", "B.png", "a.png", "10.png", "2.png"]);
        sort_pages(&mut pages);
        assert_eq!(
            names(&pages),
            vec!["10.png", "2.png", "B.png", "a.png", "b.png"]
        );
    }
}
