use crate::testvar::get_debug;
use engkit_error::{EngError, EngResult};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    #[default]
    Truncate,
    Append,
}

/// Write `content` to `path`, creating the file if needed. The parent
/// directory must exist.
pub fn write_file(path: &Path, content: &str, mode: WriteMode) -> EngResult<()> {
    let mut options = OpenOptions::new();
    options.create(true);
    match mode {
        WriteMode::Truncate => options.write(true).truncate(true),
        WriteMode::Append => options.append(true),
    };
    let file_err = |source| {
        log::error!("File Open Error");
        log::debug!("{}", get_debug(path));
        EngError::File {
            path: path.to_path_buf(),
            source,
        }
    };
    let mut file = options.open(path).map_err(file_err)?;
    file.write_all(content.as_bytes()).map_err(file_err)?;
    Ok(())
}
