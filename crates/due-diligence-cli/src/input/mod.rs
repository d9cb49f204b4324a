pub mod file;
pub mod stdin;

use serde::de::DeserializeOwned;

/// Load typed JSON from `path` when given, else from piped stdin.
/// `Ok(None)` means neither source supplied anything.
pub fn load_json<T: DeserializeOwned>(
    path: Option<&str>,
) -> Result<Option<T>, Box<dyn std::error::Error>> {
    match path {
        Some(p) => Ok(Some(file::read_json(p)?)),
        None => stdin::read_stdin_json(),
    }
}
