pub mod font;
pub mod geometry;
pub mod loading;
pub mod mask;
pub mod surface;
pub mod ui;
