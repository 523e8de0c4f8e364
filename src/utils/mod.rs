pub mod app_error;
pub mod clock;
pub mod notification;
