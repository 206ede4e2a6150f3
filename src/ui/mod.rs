pub mod admin_panel;
pub mod chat_view;
pub mod faq_dialog;
pub mod locations;
pub mod main_window;
