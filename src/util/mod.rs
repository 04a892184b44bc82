pub(crate) mod b;
pub(crate) mod civil;
pub(crate) mod escape;
pub(crate) mod parse;
