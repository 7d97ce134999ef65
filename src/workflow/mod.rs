pub mod normalize;
pub mod patch;
pub mod setup;
