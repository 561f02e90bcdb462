pub mod auth;
pub mod cell_value;
pub mod domain;
pub mod http_client;
pub mod spreadsheet_manager;
pub mod spreadsheet_read;
