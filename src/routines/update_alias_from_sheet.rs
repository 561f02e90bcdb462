use std::{future::Future, path::Path};

use error_stack::{report, ResultExt};

use crate::{
    alias::{
        alias_writer::{AliasDefinition, AliasWriter},
        shell_reload,
    },
    config::{app_config::Settings, oauth_env::OAuthClientEnv},
    sheets::{
        auth::{
            self,
            client_secret::{ClientSecretDescriptor, ClientSecretFile},
        },
        spreadsheet_manager::SpreadsheetManager,
        spreadsheet_read::SpreadsheetRead,
    },
};

use super::routine::{ClassifyReport, Routine, RoutineError};

/// Authenticate, fetch the configured cell and write it as a shell alias.
pub struct UpdateAliasFromSheetRoutine {
    settings: Settings,
    client_env: OAuthClientEnv,
}

impl UpdateAliasFromSheetRoutine {
    pub fn new(settings: Settings, client_env: OAuthClientEnv) -> Self {
        UpdateAliasFromSheetRoutine {
            settings,
            client_env,
        }
    }

    /// Checks the OAuth environment before the config file is opened.
    /// Nothing is written to disk until [`Routine::run`].
    pub fn prepare<F>(
        env_lookup: F,
        config_path: &Path,
    ) -> error_stack::Result<Self, RoutineError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let client_env = OAuthClientEnv::from_lookup(env_lookup).classify()?;
        let settings = Settings::load(config_path).classify()?;
        Ok(Self::new(settings, client_env))
    }
}

/// Resolves `work` unless `interrupt` fires first. The run then returns
/// normally, so guards held by the caller still drop. If the interrupt
/// cannot be listened for, `work` runs to completion.
async fn until_interrupted<T>(
    work: impl Future<Output = T>,
    interrupt: impl Future<Output = std::io::Result<()>>,
) -> error_stack::Result<T, RoutineError> {
    tokio::pin!(work);
    tokio::select! {
        output = &mut work => Ok(output),
        signal = interrupt => match signal {
            Ok(()) => Err(report!(RoutineError::Interrupted))
                .attach_printable("Interrupted while waiting for authorization"),
            Err(error) => {
                log::warn!("Cannot listen for Ctrl-C: {}", error);
                Ok(work.await)
            }
        },
    }
}

#[async_trait::async_trait]
impl Routine for UpdateAliasFromSheetRoutine {
    fn name(&self) -> &str {
        "UpdateAliasFromSheetRoutine"
    }

    async fn run(&self) -> error_stack::Result<(), RoutineError> {
        let settings = &self.settings;

        // Removed on drop, including when a later stage fails.
        let client_secret = ClientSecretFile::write(
            &settings.client_secret_file_path,
            &ClientSecretDescriptor::from_env(&self.client_env),
        )
        .classify()?;

        let credential = until_interrupted(
            auth::obtain_credential(settings, &client_secret),
            tokio::signal::ctrl_c(),
        )
        .await?
        .classify()?;

        let spreadsheet = SpreadsheetManager::new(&settings.sheet_id, &credential).classify()?;
        let value = spreadsheet
            .read_cell(&settings.cell)
            .await
            .classify()?
            .unwrap_or_default();
        println!("Fetched value from {}: {}", settings.cell, value);

        let writer = AliasWriter::new(&settings.rc_file_path);
        writer
            .write(&AliasDefinition::new(&settings.alias_name, &value))
            .classify()?;
        println!(
            "Updated alias `{}` in {}",
            settings.alias_name,
            writer.path().display()
        );

        shell_reload::source_rc_file(writer.path());

        drop(client_secret);
        Ok(())
    }
}
