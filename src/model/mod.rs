pub(crate) mod animation;
pub(crate) mod options;
