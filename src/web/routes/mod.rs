pub(crate) mod assets;
pub(crate) mod index;
pub(crate) mod page;
