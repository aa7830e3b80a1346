//! 把外部传入的 1 起始页码映射到页面索引上。

use super::index::{PageIndex, PageReference};

/// 重定向的语义：非法输入回到起点，越界则临时钳制到边界。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RedirectKind {
    Default,
    Clamp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PageView {
    pub(crate) page: i64,
    pub(crate) reference: PageReference,
    pub(crate) previous_page: i64,
    pub(crate) next_page: i64,
    pub(crate) total: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    Page(PageView),
    Redirect { page: i64, kind: RedirectKind },
    /// 索引为空时没有任何可跳转的目标。
    NoContent,
}

#[derive(Debug, Clone)]
pub(crate) struct PageNavigator {
    index: PageIndex,
}

impl PageNavigator {
    pub(crate) fn new(index: PageIndex) -> Self {
        Self { index }
    }

    pub(crate) fn index(&self) -> &PageIndex {
        &self.index
    }

    /// 只接受完整的十进制整数，带空白的输入按非数字处理。
    pub(crate) fn resolve(&self, raw: &str) -> Resolution {
        match raw.parse::<i64>() {
            Ok(page) => self.resolve_number(page),
            Err(_) if self.index.is_empty() => Resolution::NoContent,
            Err(_) => Resolution::Redirect {
                page: 1,
                kind: RedirectKind::Default,
            },
        }
    }

    /// 邻页不在这里钳制，下一次请求会再次走同样的规则。
    pub(crate) fn resolve_number(&self, requested: i64) -> Resolution {
        let last = self.index.len();
        if last == 0 {
            return Resolution::NoContent;
        }
        let last_page = i64::try_from(last).unwrap_or(i64::MAX);

        if requested > last_page {
            return Resolution::Redirect {
                page: last_page,
                kind: RedirectKind::Clamp,
            };
        }
        if requested <= 0 {
            return Resolution::Redirect {
                page: 1,
                kind: RedirectKind::Clamp,
            };
        }

        let Some(reference) = usize::try_from(requested - 1)
            .ok()
            .and_then(|idx| self.index.get(idx))
        else {
            return Resolution::NoContent;
        };

        Resolution::Page(PageView {
            page: requested,
            reference: reference.clone(),
            previous_page: requested - 1,
            next_page: requested + 1,
            total: last,
        })
    }
}
