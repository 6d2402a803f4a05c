pub mod ask;
pub mod compile;
pub mod info;
pub mod init;
pub mod validate;

use std::path::Path;

use wmforge_common::WmforgeResult;
use wmforge_edit_model::EditSettings;

pub fn load_settings(path: &Path) -> WmforgeResult<EditSettings> {
    Ok(EditSettings::load(path)?)
}
