pub(crate) mod dsl;
pub(crate) mod keyed;
pub(crate) mod model;
