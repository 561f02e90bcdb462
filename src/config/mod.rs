pub mod app_config;
pub mod bash_config;
pub mod oauth_env;
pub mod sheets_config;
