pub mod resize;
pub mod ui;
