pub mod api;
pub mod normalize;
pub mod state;
pub mod views;
