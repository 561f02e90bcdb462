mod alias;
mod config;
mod routines;
mod sheets;

use crate::config::app_config::config_path;
use crate::routines::{
    routine::{Routine, RoutineError},
    update_alias_from_sheet::UpdateAliasFromSheetRoutine,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> error_stack::Result<(), RoutineError> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let routine =
        UpdateAliasFromSheetRoutine::prepare(|name| std::env::var(name).ok(), &config_path())?;
    log::info!("Running {}", routine.name());
    routine.run().await
}
