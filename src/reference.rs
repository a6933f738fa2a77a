// Reference symbol list loading
//
// The offline score conversion writes the expected performance as a JSON
// array of symbol strings. The pipeline consumes only its length, but the
// full list is loaded and validated so a malformed file aborts the session
// before any frame is processed.

use std::fs;
use std::path::Path;

use crate::error::SessionError;

/// Load the reference symbol list from a JSON array of strings.
///
/// # Errors
/// * `ReferenceUnreadable` - the file is missing or unreadable
/// * `ReferenceInvalid` - the contents are not a JSON array of strings
pub fn load_reference<P: AsRef<Path>>(path: P) -> Result<Vec<String>, SessionError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|err| SessionError::ReferenceUnreadable {
        path: path.display().to_string(),
        reason: err.to_string(),
    })?;

    let symbols: Vec<String> =
        serde_json::from_str(&contents).map_err(|err| SessionError::ReferenceInvalid {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;

    log::info!(
        "[Reference] Loaded {} reference symbols from {:?}",
        symbols.len(),
        path
    );
    Ok(symbols)
}
