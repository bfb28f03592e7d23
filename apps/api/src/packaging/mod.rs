//! Document naming and archive packaging.
//!
//! One document is delivered as-is; several are bundled into a single ZIP at
//! maximum deflate compression. Packaging is all-or-nothing.

use std::io::{Cursor, Write};

use bytes::Bytes;
use uuid::Uuid;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::locale::LetterLocale;

const PROCESS_ID_LEN: usize = 6;
const BASE36: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum PackagingError {
    #[error("no documents to package")]
    Empty,

    #[error("archive entry '{name}' failed: {source}")]
    Entry {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("archive write failed: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// One rendered letter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterDocument {
    pub name: String,
    pub bytes: Bytes,
}

/// What gets attached to the team mail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliverableArtifact {
    Single(LetterDocument),
    Archive { name: String, bytes: Bytes },
}

impl DeliverableArtifact {
    pub fn file_name(&self) -> &str {
        match self {
            DeliverableArtifact::Single(doc) => &doc.name,
            DeliverableArtifact::Archive { name, .. } => name,
        }
    }

    pub fn bytes(&self) -> &Bytes {
        match self {
            DeliverableArtifact::Single(doc) => &doc.bytes,
            DeliverableArtifact::Archive { bytes, .. } => bytes,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Naming
// ────────────────────────────────────────────────────────────────────────────

/// Short, human-quotable process id: six uppercase base-36 characters.
pub fn new_process_id() -> String {
    let mut n = Uuid::new_v4().as_u128();
    let mut id = String::with_capacity(PROCESS_ID_LEN);
    for _ in 0..PROCESS_ID_LEN {
        id.push(BASE36[(n % 36) as usize] as char);
        n /= 36;
    }
    id
}

/// `Brief_<id>.pdf` for a single recipient, `Brief_<id>_NN.pdf` (1-based) otherwise.
pub fn document_name(locale: &LetterLocale, process_id: &str, index: usize, total: usize) -> String {
    if total <= 1 {
        format!("{}_{}.pdf", locale.document_prefix, process_id)
    } else {
        format!("{}_{}_{:02}.pdf", locale.document_prefix, process_id, index + 1)
    }
}

pub fn archive_name(locale: &LetterLocale, process_id: &str) -> String {
    format!("{}_{}.zip", locale.archive_prefix, process_id)
}

// ────────────────────────────────────────────────────────────────────────────
// Packaging
// ────────────────────────────────────────────────────────────────────────────

/// Returns the lone document unchanged, or a ZIP with one entry per document.
pub fn package(
    documents: Vec<LetterDocument>,
    archive_name: String,
) -> Result<DeliverableArtifact, PackagingError> {
    match documents.len() {
        0 => Err(PackagingError::Empty),
        1 => {
            let mut documents = documents;
            let doc = documents.remove(0);
            Ok(DeliverableArtifact::Single(doc))
        }
        _ => {
            let bytes = zip_documents(&documents)?;
            Ok(DeliverableArtifact::Archive {
                name: archive_name,
                bytes: Bytes::from(bytes),
            })
        }
    }
}

fn zip_documents(documents: &[LetterDocument]) -> Result<Vec<u8>, PackagingError> {
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(9));

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for doc in documents {
        writer.start_file(doc.name.as_str(), options)?;
        writer
            .write_all(&doc.bytes)
            .map_err(|source| PackagingError::Entry {
                name: doc.name.clone(),
                source,
            })?;
    }
    Ok(writer.finish()?.into_inner())
}
