//! Remote catalog appends driven by events.
//!
//! An `AppendPlantRequest` is checked locally, then the remote
//! read-modify-write runs on the `IoTaskPool`. At most one append is in
//! flight; a finished append is polled in a later frame and either reflected
//! into the local `PlantCatalog` or reported as a failure.

use std::sync::Arc;

use bevy::prelude::*;
use bevy::tasks::{block_on, IoTaskPool, Task};
use garden::notifications::NotificationEvent;
use garden::plant_catalog::{CatalogError, PlantCatalog, PlantDefinition};
use garden::GardenSet;

use crate::catalog_sync::append_plant;
use crate::credentials::load_credential;
use crate::document_store::{DocumentAddress, DocumentStore, VersionToken};
use crate::kv_store::LocalStore;
use crate::save_error::SaveError;

// =============================================================================
// Resources and events
// =============================================================================

/// The remote catalog document this session appends to.
#[derive(Resource, Clone)]
pub struct RemoteCatalog {
    pub store: Arc<dyn DocumentStore>,
    pub address: DocumentAddress,
}

impl RemoteCatalog {
    pub fn new(store: impl DocumentStore + 'static, address: DocumentAddress) -> Self {
        Self {
            store: Arc::new(store),
            address,
        }
    }
}

/// Request to add a new plant definition to the shared catalog.
#[derive(Event, Debug, Clone)]
pub struct AppendPlantRequest(pub PlantDefinition);

#[derive(Event, Debug, Clone, PartialEq)]
pub enum CatalogSyncEvent {
    /// Remote write succeeded and the local catalog now holds the plant.
    Appended { id: String, version: String },
    /// The local catalog is unchanged. The remote is unchanged too, unless
    /// `message` says the plant was added to the shared catalog.
    Failed {
        id: String,
        message: String,
        conflict: bool,
    },
    /// No credential is stored; the append was not attempted.
    CredentialRequired { id: String },
}

impl CatalogSyncEvent {
    /// The plant the event is about.
    pub fn id(&self) -> &str {
        match self {
            CatalogSyncEvent::Appended { id, .. }
            | CatalogSyncEvent::Failed { id, .. }
            | CatalogSyncEvent::CredentialRequired { id } => id,
        }
    }
}

struct PendingAppend {
    definition: PlantDefinition,
    task: Task<Result<VersionToken, SaveError>>,
}

#[derive(Resource, Default)]
pub struct AppendInFlight(Option<PendingAppend>);

impl AppendInFlight {
    pub fn is_busy(&self) -> bool {
        self.0.is_some()
    }
}

// =============================================================================
// Systems
// =============================================================================

fn report_failure(
    id: &str,
    err: &SaveError,
    events: &mut EventWriter<CatalogSyncEvent>,
    notifications: &mut EventWriter<NotificationEvent>,
) {
    warn!("Adding plant '{id}' failed: {err}");
    events.send(CatalogSyncEvent::Failed {
        id: id.to_string(),
        message: err.to_string(),
        conflict: err.is_conflict(),
    });
    notifications.send(NotificationEvent::warning(format!(
        "Could not add plant: {err}"
    )));
}

fn check_request(
    def: &PlantDefinition,
    catalog: &PlantCatalog,
    in_flight: &AppendInFlight,
    remote: Option<&RemoteCatalog>,
) -> Result<(), SaveError> {
    if in_flight.is_busy() {
        return Err(SaveError::AppendInFlight);
    }
    def.validate()?;
    if catalog.contains(&def.id) {
        return Err(CatalogError::DuplicateId(def.id.clone()).into());
    }
    if remote.is_none() {
        return Err(SaveError::NotConfigured);
    }
    Ok(())
}

fn start_catalog_appends(
    mut requests: EventReader<AppendPlantRequest>,
    remote: Option<Res<RemoteCatalog>>,
    local: Res<LocalStore>,
    catalog: Res<PlantCatalog>,
    mut in_flight: ResMut<AppendInFlight>,
    mut events: EventWriter<CatalogSyncEvent>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    for AppendPlantRequest(def) in requests.read() {
        let remote = remote.as_deref();
        if let Err(e) = check_request(def, &catalog, &in_flight, remote) {
            report_failure(&def.id, &e, &mut events, &mut notifications);
            continue;
        }
        let Some(remote) = remote else {
            continue;
        };

        let credential = match load_credential(local.store()) {
            Ok(credential) => credential,
            Err(SaveError::MissingCredential) => {
                info!("Credential required before adding plant '{}'", def.id);
                events.send(CatalogSyncEvent::CredentialRequired { id: def.id.clone() });
                notifications.send(NotificationEvent::warning(
                    "Enter an access token to add plants to the shared catalog",
                ));
                continue;
            }
            Err(e) => {
                report_failure(&def.id, &e, &mut events, &mut notifications);
                continue;
            }
        };

        let store = Arc::clone(&remote.store);
        let address = remote.address.clone();
        let definition = def.clone();
        let task_def = def.clone();
        let task = IoTaskPool::get().spawn(async move {
            append_plant(store.as_ref(), &address, &credential, &task_def)
        });
        debug!("Started remote append of '{}'", definition.id);
        in_flight.0 = Some(PendingAppend { definition, task });
    }
}

fn finish_catalog_appends(
    mut in_flight: ResMut<AppendInFlight>,
    mut catalog: ResMut<PlantCatalog>,
    mut events: EventWriter<CatalogSyncEvent>,
    mut notifications: EventWriter<NotificationEvent>,
) {
    let Some(pending) = in_flight.0.as_mut() else {
        return;
    };
    let Some(result) = block_on(futures_lite::future::poll_once(&mut pending.task)) else {
        return;
    };
    let Some(PendingAppend { definition, .. }) = in_flight.0.take() else {
        return;
    };

    let id = definition.id.clone();
    let name = definition.name.clone();
    let version = match result {
        Ok(version) => version,
        Err(e) => {
            report_failure(&id, &e, &mut events, &mut notifications);
            return;
        }
    };
    if let Err(e) = catalog.insert(definition) {
        warn!("Plant '{id}' reached the shared catalog (version {version}) but not the local one: {e}");
        events.send(CatalogSyncEvent::Failed {
            id: id.clone(),
            message: format!(
                "Plant '{id}' was added to the shared catalog (version {version}) but not locally: {e}"
            ),
            conflict: false,
        });
        notifications.send(NotificationEvent::warning(format!(
            "{name} was added to the shared catalog but could not be shown locally: {e}"
        )));
        return;
    }

    info!("Added plant '{id}' to the shared catalog (version {version})");
    events.send(CatalogSyncEvent::Appended {
        id,
        version: version.to_string(),
    });
    notifications.send(NotificationEvent::info(format!("Added {name}")));
}

// =============================================================================
// Plugin
// =============================================================================

pub struct CatalogSyncPlugin;

impl Plugin for CatalogSyncPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<AppendInFlight>()
            .add_event::<AppendPlantRequest>()
            .add_event::<CatalogSyncEvent>()
            .add_systems(
                Update,
                (finish_catalog_appends, start_catalog_appends)
                    .chain()
                    .in_set(GardenSet::Effects),
            );
    }
}
