pub mod routine;
pub mod update_alias_from_sheet;
