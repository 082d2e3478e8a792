pub mod app;
pub mod keybindings;
pub mod view;
