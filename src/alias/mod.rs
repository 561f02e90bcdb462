pub mod alias_writer;
pub mod shell_reload;
