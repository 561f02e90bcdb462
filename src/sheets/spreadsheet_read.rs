use error_stack::{Result, ResultExt};

use super::{
    cell_value::first_cell_value,
    domain::a1_notation::{CellReference, ToA1Notation},
    spreadsheet_manager::{api_failure, SpreadsheetManager, SpreadsheetManagerError},
};

pub trait SpreadsheetRead {
    /// Display value of `cell` on the first worksheet; `None` when blank.
    fn read_cell(
        &self,
        cell: &CellReference,
    ) -> impl std::future::Future<Output = Result<Option<String>, SpreadsheetManagerError>> + Send;
}

impl SpreadsheetRead for SpreadsheetManager {
    async fn read_cell(
        &self,
        cell: &CellReference,
    ) -> Result<Option<String>, SpreadsheetManagerError> {
        let sheet_title = self.first_sheet_title().await?;
        let range = cell.to_a1_notation(Some(&sheet_title));
        log::debug!("Reading range {}", range);

        let (_, value_range) = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, range.as_ref())
            .doit()
            .await
            .map_err(|error| api_failure(error, SpreadsheetManagerError::FailedToFetchRange))
            .attach_printable_lazy(|| format!("Range: {}", range))?;

        Ok(first_cell_value(value_range.values))
    }
}
