//! 漫画页面索引：列举数据源、排序、压平，以及页码导航。

pub(crate) mod drive;
pub(crate) mod index;
pub(crate) mod lister;
pub(crate) mod local;
pub(crate) mod navigator;
pub(crate) mod ordering;
