/// `[bash]` section of the config file.
#[derive(serde::Deserialize, Debug, Clone, Default)]
pub struct BashConfig {
    pub alias_name: Option<String>,
    pub rc_file: Option<String>,
}
