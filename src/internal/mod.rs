pub mod comments;
pub mod models;
pub mod navigation;
pub mod notification;
pub mod sidebar;
pub mod summary;
pub mod ui;
