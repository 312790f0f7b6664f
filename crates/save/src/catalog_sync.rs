//! Appending plant definitions to the remote catalog document.

use garden::plant_catalog::{CatalogError, PlantCatalog, PlantDefinition};
use serde_json::Value;

use crate::credentials::Credential;
use crate::document_store::{DocumentAddress, DocumentStore, VersionToken};
use crate::optimistic::read_modify_write;
use crate::save_error::SaveError;

pub const CATALOG_DOCUMENT_PATH: &str = "plants.json";

pub fn change_message(def: &PlantDefinition) -> String {
    format!("Add plant: {}", def.name)
}

/// Appends `def` to the catalog array. Existing entries are kept as raw JSON
/// values, so fields and number forms this client does not model survive.
fn append_to_document(bytes: &[u8], def: &PlantDefinition) -> Result<Vec<u8>, SaveError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| SaveError::RemoteSync(format!("catalog is not UTF-8: {e}")))?;
    let mut entries: Vec<Value> = serde_json::from_str(text)
        .map_err(|e| SaveError::RemoteSync(format!("catalog does not decode: {e}")))?;
    if entries
        .iter()
        .any(|entry| entry.get("id").and_then(Value::as_str) == Some(def.id.as_str()))
    {
        return Err(CatalogError::DuplicateId(def.id.clone()).into());
    }
    entries.push(serde_json::to_value(def).map_err(|e| SaveError::Encode(e.to_string()))?);
    let mut encoded =
        serde_json::to_string_pretty(&entries).map_err(|e| SaveError::Encode(e.to_string()))?;
    encoded.push('\n');
    Ok(encoded.into_bytes())
}

/// Appends `def` to the remote catalog in one guarded read-modify-write.
pub fn append_plant(
    store: &dyn DocumentStore,
    address: &DocumentAddress,
    credential: &Credential,
    def: &PlantDefinition,
) -> Result<VersionToken, SaveError> {
    def.validate()?;
    let (_, version) = read_modify_write(
        store,
        address,
        credential,
        &change_message(def),
        |bytes| Ok((append_to_document(bytes, def)?, ())),
    )?;
    Ok(version)
}

/// Appends remotely, then adds the definition to the local catalog.
///
/// The local catalog changes only if the remote write succeeded.
pub fn append_and_reflect(
    store: &dyn DocumentStore,
    address: &DocumentAddress,
    credential: &Credential,
    catalog: &mut PlantCatalog,
    def: PlantDefinition,
) -> Result<VersionToken, SaveError> {
    if catalog.contains(&def.id) {
        return Err(CatalogError::DuplicateId(def.id).into());
    }
    let version = append_plant(store, address, credential, &def)?;
    catalog.insert(def)?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document_store::{MemoryDocumentStore, VersionedDocument};
    use garden::plant_catalog::RowCount;

    fn address() -> DocumentAddress {
        DocumentAddress::new("garden-club", "plants", CATALOG_DOCUMENT_PATH)
    }

    fn credential() -> Credential {
        Credential::new("token")
    }

    fn def(id: &str, name: &str) -> PlantDefinition {
        PlantDefinition {
            id: id.to_string(),
            name: name.to_string(),
            spacing_inches: 12.0,
            row_count: RowCount::Double,
            stagger: true,
            color: "#8bc34a".to_string(),
            icon: "leaf".to_string(),
        }
    }

    fn seeded_store() -> MemoryDocumentStore {
        let initial = serde_json::to_string_pretty(&vec![def("kale", "Kale")]).unwrap();
        MemoryDocumentStore::new().with_document(address(), initial)
    }

    fn remote_ids(store: &MemoryDocumentStore) -> Vec<String> {
        let bytes = store.document(&address()).unwrap();
        let entries: Vec<Value> = serde_json::from_slice(&bytes).unwrap();
        entries
            .iter()
            .map(|entry| entry["id"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_append_writes_definition_and_message() {
        let store = seeded_store();
        append_plant(&store, &address(), &credential(), &def("chard", "Swiss Chard")).unwrap();

        assert_eq!(remote_ids(&store), vec!["kale", "chard"]);
        assert_eq!(store.commits()[0].message, "Add plant: Swiss Chard");
    }

    #[test]
    fn test_append_and_reflect_updates_local_catalog() {
        let store = seeded_store();
        let mut catalog = PlantCatalog::from_definitions(vec![def("kale", "Kale")]).unwrap();
        append_and_reflect(&store, &address(), &credential(), &mut catalog, def("pea", "Pea"))
            .unwrap();
        assert!(catalog.contains("pea"));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_remote_duplicate_is_rejected() {
        let store = seeded_store();
        let err = append_plant(&store, &address(), &credential(), &def("kale", "Kale")).unwrap_err();
        assert!(matches!(err, SaveError::Catalog(CatalogError::DuplicateId(_))));
        assert!(store.commits().is_empty());
    }

    #[test]
    fn test_existing_entries_pass_through_untouched() {
        let seeded = r##"[
  {
    "id": "kale",
    "name": "Kale",
    "spacingInches": 18,
    "rowCount": 3,
    "stagger": false,
    "color": "#2e7d32",
    "notes": "cold hardy"
  }
]"##;
        let store = MemoryDocumentStore::new().with_document(address(), seeded);
        append_plant(&store, &address(), &credential(), &def("pea", "Pea")).unwrap();

        let bytes = store.document(&address()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with(&seeded[..seeded.len() - 2]), "got: {text}");

        let entries: Vec<Value> = serde_json::from_str(&text).unwrap();
        let original: Vec<Value> = serde_json::from_str(seeded).unwrap();
        assert_eq!(entries[0], original[0]);
        assert_eq!(entries[0]["notes"], "cold hardy");
        assert_eq!(entries[0]["spacingInches"].as_u64(), Some(18));
        assert_eq!(entries[1]["id"], "pea");
    }

    #[test]
    fn test_entry_this_client_cannot_decode_does_not_block_append() {
        let seeded = r#"[{"id": "squash", "name": "Squash", "spacingInches": 36, "rowCount": 3}]"#;
        let store = MemoryDocumentStore::new().with_document(address(), seeded);
        append_plant(&store, &address(), &credential(), &def("pea", "Pea")).unwrap();

        assert_eq!(remote_ids(&store), vec!["squash", "pea"]);
        let bytes = store.document(&address()).unwrap();
        let entries: Vec<Value> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(entries[0]["rowCount"].as_u64(), Some(3));
        assert!(entries[0].get("icon").is_none());
    }

    #[test]
    fn test_undecodable_remote_is_sync_error() {
        let store = MemoryDocumentStore::new().with_document(address(), "{\"not\": \"an array\"}");
        let mut catalog = PlantCatalog::default();
        let err = append_and_reflect(&store, &address(), &credential(), &mut catalog, def("pea", "Pea"))
            .unwrap_err();
        assert!(err.is_remote_sync());
        assert!(catalog.is_empty());
        assert_eq!(
            store.document(&address()).unwrap(),
            b"{\"not\": \"an array\"}"
        );
    }

    #[test]
    fn test_invalid_definition_never_reaches_remote() {
        let store = seeded_store();
        let mut bad = def("pea", "Pea");
        bad.spacing_inches = 0.0;
        let err = append_plant(&store, &address(), &credential(), &bad).unwrap_err();
        assert!(matches!(err, SaveError::Catalog(_)));
        assert!(store.commits().is_empty());
    }

    /// A second client commits between our read and our write.
    struct RacingStore {
        inner: MemoryDocumentStore,
    }

    impl DocumentStore for RacingStore {
        fn read(
            &self,
            address: &DocumentAddress,
            credential: &Credential,
        ) -> Result<VersionedDocument, SaveError> {
            let doc = self.inner.read(address, credential)?;
            let racing = serde_json::to_string_pretty(&vec![def("kale", "Kale"), def("leek", "Leek")])
                .map_err(|e| SaveError::Encode(e.to_string()))?;
            self.inner.force_put(address, racing);
            Ok(doc)
        }

        fn write(
            &self,
            address: &DocumentAddress,
            content: &[u8],
            expected: &VersionToken,
            message: &str,
            credential: &Credential,
        ) -> Result<VersionToken, SaveError> {
            self.inner
                .write(address, content, expected, message, credential)
        }
    }

    #[test]
    fn test_version_conflict_leaves_local_catalog_unchanged() {
        let store = RacingStore {
            inner: seeded_store(),
        };
        let mut catalog = PlantCatalog::from_definitions(vec![def("kale", "Kale")]).unwrap();
        let before = catalog.clone();

        let err = append_and_reflect(&store, &address(), &credential(), &mut catalog, def("pea", "Pea"))
            .unwrap_err();

        assert!(err.is_conflict(), "got: {err}");
        assert_eq!(catalog, before);
        assert_eq!(remote_ids(&store.inner), vec!["kale", "leek"]);
        assert!(store.inner.commits().is_empty());
    }
}
