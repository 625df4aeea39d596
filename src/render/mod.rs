pub(crate) mod elements;
pub(crate) mod encode;
pub(crate) mod renderer;
pub(crate) mod surface;
