//! Reference data files of a `.doc_gen` folder.
//!
//! - `metadata/services.yaml`: a map keyed by service id
//! - `metadata/sdks.yaml`: a map keyed by SDK name, each with an `sdk` map
//!   keyed by major version
//! - `cross-content/`: files that may be referenced as block content

use crate::{parse_file, ParserError, Result};
use docmeta_core::{DataValue, ReferenceData};
use std::collections::BTreeSet;
use std::path::Path;

/// Load services, SDKs and the block-content listing below `doc_gen`.
///
/// A missing `cross-content` folder yields an empty listing.
pub fn load_reference_data(doc_gen: &Path) -> Result<ReferenceData> {
    let metadata = doc_gen.join("metadata");
    let services_path = metadata.join("services.yaml");
    let sdks_path = metadata.join("sdks.yaml");

    let mut reference = ReferenceData::new();
    reference.services = map_keys(&parse_file(&services_path)?, &services_path)?;

    let sdks = parse_file(&sdks_path)?;
    let entries = sdks.as_map().ok_or_else(|| invalid(&sdks_path, "expected a map of SDKs"))?;
    for (name, sdk) in entries {
        let versions = match sdk.get("sdk") {
            Some(versions @ DataValue::Map(_)) => map_keys(versions, &sdks_path)?,
            _ => BTreeSet::new(),
        };
        reference.sdks.insert(name.key_text(), versions);
    }

    reference.block_content = list_block_content(&doc_gen.join("cross-content"))?;
    Ok(reference)
}

/// File names directly inside `dir`, or an empty set if it does not exist.
pub fn list_block_content(dir: &Path) -> Result<BTreeSet<String>> {
    let mut files = BTreeSet::new();
    if !dir.is_dir() {
        return Ok(files);
    }
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.insert(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(files)
}

fn map_keys(value: &DataValue, file: &Path) -> Result<BTreeSet<String>> {
    let entries = value
        .as_map()
        .ok_or_else(|| invalid(file, "expected a map at the top level"))?;
    Ok(entries.iter().map(|(k, _)| k.key_text()).collect())
}

fn invalid(file: &Path, message: &str) -> ParserError {
    ParserError::InvalidReference {
        file: file.display().to_string(),
        message: message.to_string(),
    }
}
