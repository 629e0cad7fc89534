//! Navigation data serialization.
//!
//! The browser cannot read the filesystem, so the scanned tree is shipped
//! either as a JSON document or as a script assigning it to a global
//! binding (`window.MAIN_NAV_DATA = [...];`).

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::error::ScanError;
use crate::model::NavigationTree;

/// Default global binding for the script form.
pub const DEFAULT_BINDING: &str = "MAIN_NAV_DATA";

/// Serialized navigation data format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataFormat {
    /// Plain JSON document.
    #[default]
    Json,
    /// `window.<binding> = <json>;` script.
    Js,
}

/// Pretty-prints the tree as JSON with two-space indentation.
///
/// # Errors
///
/// Returns `ScanError::Json` if serialization fails.
pub fn to_json(tree: &NavigationTree) -> Result<String, ScanError> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"  ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    tree.serialize(&mut ser)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Renders the tree as a script assigning it to `window.<binding>`.
///
/// # Errors
///
/// Returns `ScanError::Json` if serialization fails.
pub fn to_script(tree: &NavigationTree, binding: &str) -> Result<String, ScanError> {
    Ok(format!("window.{binding} = {};\n", to_json(tree)?))
}

/// Renders the tree in the requested format.
///
/// # Errors
///
/// Returns `ScanError::Json` if serialization fails.
pub fn render(tree: &NavigationTree, format: DataFormat, binding: &str) -> Result<String, ScanError> {
    match format {
        DataFormat::Json => to_json(tree).map(|mut s| {
            s.push('\n');
            s
        }),
        DataFormat::Js => to_script(tree, binding),
    }
}

/// Writes the rendered tree to `path`, creating parent directories.
///
/// # Errors
///
/// Returns `ScanError::Write` on I/O failure.
pub fn write(
    tree: &NavigationTree,
    path: &Path,
    format: DataFormat,
    binding: &str,
) -> Result<(), ScanError> {
    let content = render(tree, format, binding)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| ScanError::Write {
            path: path.to_path_buf(),
            source,
        })?;
    }
    fs::write(path, content).map_err(|source| ScanError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses navigation data in either JSON or script form.
///
/// # Errors
///
/// Returns `ScanError::Json` if the payload is not a navigation tree.
pub fn parse(text: &str) -> Result<NavigationTree, ScanError> {
    let trimmed = text.trim();
    let payload = if trimmed.starts_with("window.") {
        let (_, rhs) = trimmed.split_once('=').unwrap_or(("", trimmed));
        rhs.trim().trim_end_matches(';')
    } else {
        trimmed
    };
    Ok(serde_json::from_str(payload)?)
}
