//! Read-version, mutate, write-with-version-check.

use crate::credentials::Credential;
use crate::document_store::{DocumentAddress, DocumentStore, VersionToken};
use crate::save_error::SaveError;

/// Reads the document, lets `mutate` produce new content, and writes it back
/// guarded by the version that was read.
///
/// Any error from the read, from `mutate`, or from the write aborts the whole
/// update; nothing is retried and the remote document is left untouched.
/// Returns whatever `mutate` produced alongside the new version.
pub fn read_modify_write<T, F>(
    store: &dyn DocumentStore,
    address: &DocumentAddress,
    credential: &Credential,
    message: &str,
    mutate: F,
) -> Result<(T, VersionToken), SaveError>
where
    F: FnOnce(&[u8]) -> Result<(Vec<u8>, T), SaveError>,
{
    let current = store.read(address, credential)?;
    let (content, output) = mutate(&current.content)?;
    let version = store.write(address, &content, &current.version, message, credential)?;
    Ok((output, version))
}
