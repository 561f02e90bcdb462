use error_stack::{report, Report, Result, ResultExt};
use google_sheets4::{Error as Sheets4Error, Sheets};
use serde_json::Value;
use thiserror::Error;

use super::{
    auth::credential::Credential,
    http_client::{self, HttpsConnector},
};

const SCOPE_INSUFFICIENT_REASON: &str = "ACCESS_TOKEN_SCOPE_INSUFFICIENT";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetManagerError {
    #[error("Spreadsheet not found or not accessible")]
    SpreadsheetNotFound,
    #[error("Spreadsheet has no worksheets")]
    NoWorksheets,
    #[error("Credential scope does not allow reading the spreadsheet")]
    InsufficientScope,
    #[error("Credential was rejected by the Sheets API")]
    Unauthorized,
    #[error("Failed to fetch sheet title")]
    FailedToFetchSheetTitle,
    #[error("Failed to fetch range")]
    FailedToFetchRange,
    #[error("Failed to set up the HTTPS client")]
    HttpClient,
}

pub struct SpreadsheetManager {
    pub(super) spreadsheet_id: String,
    pub(super) hub: Sheets<HttpsConnector>,
}

impl std::fmt::Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SpreadsheetManager {{ spreadsheet_id: {:?} }}",
            self.spreadsheet_id
        )
    }
}

impl SpreadsheetManager {
    pub fn new(
        spreadsheet_id: &str,
        credential: &Credential,
    ) -> Result<Self, SpreadsheetManagerError> {
        let access_token = credential
            .access_token()
            .ok_or(report!(SpreadsheetManagerError::Unauthorized))?;

        let client =
            http_client::http_client().change_context(SpreadsheetManagerError::HttpClient)?;
        let hub = Sheets::new(client, access_token.to_string());

        Ok(SpreadsheetManager {
            spreadsheet_id: spreadsheet_id.to_string(),
            hub,
        })
    }

    /// Title of the worksheet with the lowest index.
    pub async fn first_sheet_title(&self) -> Result<String, SpreadsheetManagerError> {
        let (_, spreadsheet) = self
            .hub
            .spreadsheets()
            .get(&self.spreadsheet_id)
            .param("fields", "sheets.properties(title,index)")
            .doit()
            .await
            .map_err(|error| {
                api_failure(error, SpreadsheetManagerError::FailedToFetchSheetTitle)
            })?;

        spreadsheet
            .sheets
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sheet| sheet.properties)
            .filter(|properties| properties.title.is_some())
            .min_by_key(|properties| properties.index.unwrap_or(i32::MAX))
            .and_then(|properties| properties.title)
            .ok_or(report!(SpreadsheetManagerError::NoWorksheets))
    }
}

/// Lifts a Sheets API error into a report whose context says why the call
/// failed. `fallback` is used for failures that are neither access nor
/// authorization problems.
pub(super) fn api_failure(
    error: Sheets4Error,
    fallback: SpreadsheetManagerError,
) -> Report<SpreadsheetManagerError> {
    let context = classify_api_error(&error).unwrap_or(fallback);
    Report::new(error).change_context(context)
}

fn classify_api_error(error: &Sheets4Error) -> Option<SpreadsheetManagerError> {
    match error {
        Sheets4Error::BadRequest(body) => {
            let status = body["error"]["code"].as_u64()?;
            classify_status(u16::try_from(status).ok()?, Some(body))
        }
        Sheets4Error::Failure(response) => classify_status(response.status().as_u16(), None),
        _ => None,
    }
}

fn classify_status(status: u16, body: Option<&Value>) -> Option<SpreadsheetManagerError> {
    match status {
        401 => Some(SpreadsheetManagerError::Unauthorized),
        403 if body.map_or(false, is_scope_insufficient) => {
            Some(SpreadsheetManagerError::InsufficientScope)
        }
        403 | 404 => Some(SpreadsheetManagerError::SpreadsheetNotFound),
        _ => None,
    }
}

fn is_scope_insufficient(body: &Value) -> bool {
    let error = &body["error"];

    let detail_reason = error["details"]
        .as_array()
        .into_iter()
        .flatten()
        .any(|detail| detail["reason"] == SCOPE_INSUFFICIENT_REASON);

    let legacy_reason = error["errors"]
        .as_array()
        .into_iter()
        .flatten()
        .any(|detail| detail["reason"] == "insufficientPermissions");

    let message = error["message"]
        .as_str()
        .map_or(false, |message| {
            message
                .to_ascii_lowercase()
                .contains("insufficient authentication scopes")
        });

    detail_reason || legacy_reason || message
}
