/// `[google]` section of the config file.
///
/// Every key is optional at the serde level so that a missing key can be
/// reported by name instead of as a generic deserialization failure.
#[derive(serde::Deserialize, Debug, Clone, Default)]
pub struct SheetsConfig {
    pub sheet_id: Option<String>,
    pub cell: Option<String>,
    pub token_file: Option<String>,
    pub client_secret_file: Option<String>,
}
