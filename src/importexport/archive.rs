//! The Import/Export Boundary (C9): enumerate the full snapshot into a zip
//! archive holding `db.json` plus one rendered object file per document, and
//! the reverse -- decode `db.json` back into Add/Update calls. Packaging
//! itself (zip framing, per-document text rendering) is the only piece the
//! spec asks this crate to own; the CLI-level plaintext/Markdown *body*
//! formats beyond this boundary are an external collaborator's concern.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::core::types::{Document, StoreSnapshot};
use crate::id::generator;
use crate::id::prefix_table::PrefixTable;
use crate::importexport::formats::{self, ExportFormat};
use crate::importexport::slug;
use crate::mutation::validate;

const SNAPSHOT_ENTRY: &str = "db.json";

fn object_filename(doc: &Document, simple_id: &str, format: ExportFormat) -> String {
    let order = simple_id.replace('.', "-");
    let slug = slug::slug_for(&doc.title, &doc.body);
    format!("{}-{}-{}.{}", doc.uuid, order, slug, format.extension())
}

/// Write every document in `documents` (the full snapshot) into a zip
/// archive at `archive_path`: a `db.json` snapshot plus one rendered object
/// file per document, named per the spec's `<uuid>-<order>-<title>.<ext>`
/// rule.
pub fn export(documents: &[Document], config: &Config, prefixes: &PrefixTable, archive_path: &Path, format: ExportFormat) -> Result<()> {
    let canon = generator::canonicalize(documents, config, prefixes);

    let file = File::create(archive_path).map_err(|e| Error::io_at(&archive_path.to_path_buf(), e))?;
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default();

    let snapshot = StoreSnapshot {
        documents: documents.to_vec(),
        metadata: crate::core::types::StoreMetadata::new(),
    };
    zip.start_file(SNAPSHOT_ENTRY, options)?;
    zip.write_all(&serde_json::to_vec_pretty(&snapshot)?)?;

    for doc in documents {
        let simple_id = canon.simple_id(&doc.uuid).unwrap_or_default();
        let filename = object_filename(doc, simple_id, format);
        zip.start_file(filename, options)?;
        zip.write_all(formats::render(doc, format).as_bytes())?;
    }

    zip.finish()?;
    tracing::info!(path = %archive_path.display(), documents = documents.len(), "exported archive");
    Ok(())
}

/// Decode the `db.json` snapshot inside `archive_path` and apply each
/// document: existing UUIDs are updated in place, new ones are inserted
/// with their incoming UUID and timestamps preserved. Every incoming
/// document still passes through the same dimension validation as a
/// regular Add/Update -- import never bypasses the invariants.
pub fn import(documents: &mut Vec<Document>, config: &Config, archive_path: &Path) -> Result<usize> {
    let file = File::open(archive_path).map_err(|e| Error::io_at(&archive_path.to_path_buf(), e))?;
    let mut zip = ZipArchive::new(file)?;
    let mut entry = zip.by_name(SNAPSHOT_ENTRY)?;
    let mut contents = String::new();
    entry.read_to_string(&mut contents)?;
    drop(entry);

    let incoming: StoreSnapshot = serde_json::from_str(&contents)?;

    let mut count = 0;
    for doc in incoming.documents {
        validate::validate_patch(&doc.dimensions, config, documents, Some(doc.uuid))?;

        match documents.iter_mut().find(|d| d.uuid == doc.uuid) {
            Some(existing) => {
                existing.title = doc.title;
                existing.body = doc.body;
                existing.dimensions = doc.dimensions;
                existing.touch();
            }
            None => documents.push(doc),
        }
        count += 1;
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Dimension;
    use crate::mutation::add::add;
    use tempfile::tempdir;

    fn config() -> Config {
        Config::new("unused").with_dimension(
            Dimension::enumerated("status", vec!["pending".into(), "completed".into()]).with_default("pending"),
        )
    }

    #[test]
    fn round_trips_through_export_and_import() {
        let config = config();
        let prefixes = PrefixTable::build(&config).unwrap();
        let mut docs = Vec::new();
        add(&mut docs, &config, "Buy milk".into(), "2%, please".into(), Default::default()).unwrap();

        let dir = tempdir().unwrap();
        let archive_path = dir.path().join("export.zip");
        export(&docs, &config, &prefixes, &archive_path, ExportFormat::Markdown).unwrap();

        let mut restored = Vec::new();
        let count = import(&mut restored, &config, &archive_path).unwrap();
        assert_eq!(count, 1);
        assert_eq!(restored[0].title, "Buy milk");
    }
}
