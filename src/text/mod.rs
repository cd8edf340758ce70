pub(crate) mod cache;
pub(crate) mod font;
pub(crate) mod registry;
pub(crate) mod wrap;

#[cfg(test)]
#[path = "../../tests/unit/text/mock.rs"]
pub(crate) mod mock;
