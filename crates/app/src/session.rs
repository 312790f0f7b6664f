//! Headless session loop: reads JSON commands from stdin, one per line, and
//! writes one JSON response per line to stdout.
//!
//! ## Protocol
//!
//! Each input line is a JSON object with a `"cmd"` discriminator. Each output
//! line carries `"protocol_version"` and a `"type"` field. See
//! [`garden::session_protocol`] for the full schema. Logs go to stderr so they
//! never interleave with responses.

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Duration;

use bevy::prelude::*;
use garden::garden_actions::{ActionQueue, ActionResult, ActionResultLog, GardenAction};
use garden::garden_rng::GardenRng;
use garden::layout::Layout;
use garden::layout_io::export_json;
use garden::notifications::NotificationLog;
use garden::plant_catalog::{PlantCatalog, PlantDefinition};
use garden::session_protocol::{
    error_response, make_response, ResponsePayload, SessionCommand, SessionResponse,
    PROTOCOL_VERSION,
};
use garden::GardenPlugin;
use save::credentials::store_credential;
use save::file_transfer::{export_layout_file, read_layout_file};
use save::{
    AppendPlantRequest, CatalogSource, CatalogSyncEvent, LocalStore, RemoteCatalog, SavePlugin,
};

/// Pause between updates while a remote append is in flight.
const APPEND_POLL_INTERVAL: Duration = Duration::from_millis(2);
/// Roughly thirty seconds of polling.
const APPEND_MAX_UPDATES: u32 = 15_000;

// ---------------------------------------------------------------------------
// App construction
// ---------------------------------------------------------------------------

/// Everything a session needs that differs between the binary and tests.
pub struct SessionParts {
    pub store: LocalStore,
    pub catalog: CatalogSource,
    pub remote: Option<RemoteCatalog>,
    pub rng: GardenRng,
}

/// Catalog sync outcomes seen since the last `add_plant` command.
#[derive(Resource, Default)]
struct SyncOutcomes(Vec<CatalogSyncEvent>);

fn record_sync_outcomes(
    mut events: EventReader<CatalogSyncEvent>,
    mut outcomes: ResMut<SyncOutcomes>,
) {
    outcomes.0.extend(events.read().cloned());
}

/// Adds the garden and persistence plugins to an app that already has its
/// runner plugins (`MinimalPlugins`, optionally `LogPlugin`).
pub fn add_session_plugins(app: &mut App, parts: SessionParts) {
    app.insert_resource(parts.store)
        .insert_resource(parts.catalog)
        .insert_resource(parts.rng);
    if let Some(remote) = parts.remote {
        app.insert_resource(remote);
    }
    app.add_plugins((GardenPlugin, SavePlugin))
        .init_resource::<SyncOutcomes>()
        .add_systems(Last, record_sync_outcomes);
}

// ---------------------------------------------------------------------------
// Loop
// ---------------------------------------------------------------------------

fn write_response(output: &mut impl Write, response: &SessionResponse) -> std::io::Result<()> {
    serde_json::to_writer(&mut *output, response)?;
    writeln!(output)?;
    output.flush()
}

/// Runs startup, announces readiness, then serves commands until `quit` or
/// end of input.
pub fn run_session(app: &mut App, input: impl BufRead, mut output: impl Write) -> std::io::Result<()> {
    // Startup systems load the catalog and restore the cached layout.
    app.update();

    write_response(&mut output, &make_response(ResponsePayload::Ready))?;
    info!("garden session v{PROTOCOL_VERSION} ready, waiting for commands on stdin");

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<SessionCommand>(&line) {
            Ok(cmd) => process_command(cmd, app),
            Err(e) => error_response(format!("Parse error: {e}")),
        };
        let is_goodbye = matches!(response.payload, ResponsePayload::Goodbye);
        write_response(&mut output, &response)?;

        if is_goodbye {
            break;
        }
    }

    info!("garden session shutting down");
    Ok(())
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

fn process_command(cmd: SessionCommand, app: &mut App) -> SessionResponse {
    match cmd {
        SessionCommand::Catalog => {
            let plants = app.world().resource::<PlantCatalog>().definitions().to_vec();
            make_response(ResponsePayload::Catalog { plants })
        }

        SessionCommand::Layout => {
            let plants = app.world().resource::<Layout>().plants().to_vec();
            make_response(ResponsePayload::Layout { plants })
        }

        SessionCommand::Act { action } => {
            let result = run_action(app, action);
            make_response(ResponsePayload::ActionResult { result })
        }

        SessionCommand::BatchAct { actions } => {
            let results = actions
                .into_iter()
                .map(|action| run_action(app, action))
                .collect();
            make_response(ResponsePayload::BatchResult { results })
        }

        SessionCommand::Export { path } => export(app, path),

        SessionCommand::Import { path } => match read_layout_file(Path::new(&path)) {
            Ok(json) => {
                let result = run_action(app, GardenAction::ImportLayout { json });
                make_response(ResponsePayload::ActionResult { result })
            }
            Err(e) => error_response(format!("Import failed: {e}")),
        },

        SessionCommand::AddPlant { plant } => add_plant(app, plant),

        SessionCommand::SetCredential { token } => {
            let store = app.world().resource::<LocalStore>().clone();
            match store_credential(store.store(), &token) {
                Ok(()) => make_response(ResponsePayload::Ok),
                Err(e) => error_response(e.to_string()),
            }
        }

        SessionCommand::Notifications => {
            let items = app.world_mut().resource_mut::<NotificationLog>().drain();
            make_response(ResponsePayload::Notifications { items })
        }

        SessionCommand::Quit => make_response(ResponsePayload::Goodbye),
    }
}

/// Queues one action, runs an update so the executor handles it, and returns
/// its result.
fn run_action(app: &mut App, action: GardenAction) -> ActionResult {
    app.world_mut().resource_mut::<ActionQueue>().push(action);
    app.update();
    app.world()
        .resource::<ActionResultLog>()
        .last_result()
        .cloned()
        .unwrap_or(ActionResult::Success)
}

fn export(app: &App, path: Option<String>) -> SessionResponse {
    let layout = app.world().resource::<Layout>();
    let document = match export_json(layout) {
        Ok(document) => document,
        Err(e) => return error_response(format!("Export failed: {e}")),
    };
    if let Some(path) = &path {
        if let Err(e) = export_layout_file(Path::new(path), layout) {
            return error_response(format!("Export failed: {e}"));
        }
    }
    make_response(ResponsePayload::Exported { path, document })
}

/// Requests a remote append and keeps updating until its outcome arrives.
///
/// A timed-out append keeps running; its outcome is applied by a later
/// update but no longer reported.
fn add_plant(app: &mut App, plant: PlantDefinition) -> SessionResponse {
    let id = plant.id.clone();
    app.world_mut().resource_mut::<SyncOutcomes>().0.clear();
    app.world_mut().send_event(AppendPlantRequest(plant));

    for _ in 0..APPEND_MAX_UPDATES {
        app.update();
        let outcome = app
            .world()
            .resource::<SyncOutcomes>()
            .0
            .iter()
            .find(|event| event.id() == id)
            .cloned();
        match outcome {
            Some(CatalogSyncEvent::Appended { id, .. }) => {
                return make_response(ResponsePayload::PlantAdded { id });
            }
            Some(CatalogSyncEvent::CredentialRequired { .. }) => {
                return make_response(ResponsePayload::CredentialRequired);
            }
            Some(CatalogSyncEvent::Failed {
                message, conflict, ..
            }) => {
                return make_response(ResponsePayload::Error { message, conflict });
            }
            None => std::thread::sleep(APPEND_POLL_INTERVAL),
        }
    }

    warn!("Remote append of '{id}' did not finish in time");
    error_response(format!("Timed out adding plant '{id}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use garden::test_harness::sample_catalog;
    use save::catalog_sync::CATALOG_DOCUMENT_PATH;
    use save::document_store::{DocumentAddress, MemoryDocumentStore};
    use serde_json::Value;

    fn address() -> DocumentAddress {
        DocumentAddress::new("club", "plants", CATALOG_DOCUMENT_PATH)
    }

    fn session_app(store: LocalStore, remote: Option<RemoteCatalog>) -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        add_session_plugins(
            &mut app,
            SessionParts {
                store,
                catalog: CatalogSource::Inline(sample_catalog().to_json_pretty().unwrap()),
                remote,
                rng: GardenRng::default(),
            },
        );
        app
    }

    /// Feeds `lines` through a fresh session and returns every response.
    fn run(app: &mut App, lines: &[&str]) -> Vec<Value> {
        let input = lines.join("\n");
        let mut output = Vec::new();
        run_session(app, input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_ready_then_goodbye() {
        let mut app = session_app(LocalStore::memory(), None);
        let responses = run(&mut app, &[r#"{"cmd":"quit"}"#, r#"{"cmd":"layout"}"#]);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0]["type"], "ready");
        assert_eq!(responses[0]["protocol_version"], 1);
        assert_eq!(responses[1]["type"], "goodbye");
    }

    #[test]
    fn test_drop_then_layout() {
        let mut app = session_app(LocalStore::memory(), None);
        let responses = run(
            &mut app,
            &[
                r#"{"cmd":"catalog"}"#,
                r#"{"cmd":"act","action":{"DropPlant":{"plant_id":"tomato","drop":{"x":240.0,"y":50.0}}}}"#,
                r#"{"cmd":"layout"}"#,
            ],
        );
        assert_eq!(responses[1]["type"], "catalog");
        assert_eq!(
            responses[1]["plants"].as_array().unwrap().len(),
            sample_catalog().len()
        );
        assert_eq!(responses[2]["type"], "action_result");
        let plants = responses[3]["plants"].as_array().unwrap();
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0]["plantId"], "tomato");
        assert_eq!(plants[0]["x"], 24);
    }

    #[test]
    fn test_bad_line_is_reported_and_session_continues() {
        let mut app = session_app(LocalStore::memory(), None);
        let responses = run(&mut app, &["{nope", "", r#"{"cmd":"layout"}"#]);
        assert_eq!(responses.len(), 3);
        assert_eq!(responses[1]["type"], "error");
        assert!(responses[1]["message"]
            .as_str()
            .unwrap()
            .starts_with("Parse error"));
        assert_eq!(responses[2]["type"], "layout");
    }

    #[test]
    fn test_rejected_drop_is_notified() {
        let mut app = session_app(LocalStore::memory(), None);
        let responses = run(
            &mut app,
            &[
                r#"{"cmd":"act","action":{"DropPlant":{"plant_id":"cactus","drop":{"x":10.0,"y":10.0}}}}"#,
                r#"{"cmd":"notifications"}"#,
                r#"{"cmd":"notifications"}"#,
            ],
        );
        let items = responses[2]["items"].as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert!(items[0]["text"].as_str().unwrap().contains("cactus"));
        assert!(responses[3]["items"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_export_and_import_file() {
        let dir = std::env::temp_dir().join("garden_session_export");
        let _ = std::fs::remove_dir_all(&dir);
        let path = dir.join("garden-plan.json");
        let path_str = path.to_string_lossy().replace('\\', "/");

        let mut app = session_app(LocalStore::memory(), None);
        let export = format!(r#"{{"cmd":"export","path":"{path_str}"}}"#);
        let import = format!(r#"{{"cmd":"import","path":"{path_str}"}}"#);
        let responses = run(
            &mut app,
            &[
                r#"{"cmd":"act","action":{"DropPlant":{"plant_id":"lettuce","drop":{"x":120.0,"y":180.0}}}}"#,
                export.as_str(),
                r#"{"cmd":"act","action":"ClearLayout"}"#,
                import.as_str(),
                r#"{"cmd":"layout"}"#,
            ],
        );
        assert_eq!(responses[2]["type"], "exported");
        assert!(path.exists());
        assert_eq!(responses[4]["type"], "action_result");
        let plants = responses[5]["plants"].as_array().unwrap();
        assert_eq!(plants.len(), 1);
        assert_eq!(plants[0]["plantId"], "lettuce");
        assert_eq!(plants[0]["lane"], 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_import_missing_file_is_error() {
        let mut app = session_app(LocalStore::memory(), None);
        let responses = run(
            &mut app,
            &[r#"{"cmd":"import","path":"/definitely/not/here.json"}"#],
        );
        assert_eq!(responses[1]["type"], "error");
    }

    #[test]
    fn test_add_plant_requires_credential() {
        let remote_store = Arc::new(MemoryDocumentStore::new().with_document(address(), "[]"));
        let remote = RemoteCatalog {
            store: remote_store.clone(),
            address: address(),
        };
        let mut app = session_app(LocalStore::memory(), Some(remote));
        let add = r##"{"cmd":"add_plant","plant":{"id":"basil","name":"Basil",
            "spacingInches":8,"rowCount":2,"stagger":true,"color":"#2a2","icon":"basil"}}"##
            .replace('\n', " ");
        let responses = run(
            &mut app,
            &[
                add.as_str(),
                r#"{"cmd":"set_credential","token":"ghp_test"}"#,
                add.as_str(),
                add.as_str(),
            ],
        );
        assert_eq!(responses[1]["type"], "credential_required");
        assert_eq!(responses[2]["type"], "ok");
        assert_eq!(responses[3]["type"], "plant_added");
        assert_eq!(responses[3]["id"], "basil");
        assert_eq!(responses[4]["type"], "error");
        assert!(app.world().resource::<PlantCatalog>().contains("basil"));
        assert_eq!(remote_store.commits().len(), 1);
        assert_eq!(remote_store.commits()[0].message, "Add plant: Basil");
    }

    #[test]
    fn test_add_plant_without_remote_is_error() {
        let mut app = session_app(LocalStore::memory(), None);
        let responses = run(
            &mut app,
            &[r##"{"cmd":"add_plant","plant":{"id":"basil","name":"Basil","spacingInches":8,"rowCount":2,"stagger":true,"color":"#2a2","icon":"basil"}}"##],
        );
        assert_eq!(responses[1]["type"], "error");
        assert!(responses[1].get("conflict").is_none());
    }
}
