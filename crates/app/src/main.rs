mod session;
mod settings;

use bevy::log::LogPlugin;
use bevy::prelude::*;
use garden::garden_rng::GardenRng;
use save::document_store::FsDocumentStore;
use save::kv_store::DirectoryStore;
use save::{CatalogSource, LocalStore, RemoteCatalog};

use session::{add_session_plugins, run_session, SessionParts};
use settings::SessionSettings;

fn main() {
    let settings = SessionSettings::from_env();

    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    // bevy's log layer writes to stderr, leaving stdout for responses.
    app.add_plugins(LogPlugin::default());

    let remote = settings.remote.as_ref().map(|remote| {
        info!(
            "Remote catalog at {} (root {})",
            remote.address,
            remote.root.display()
        );
        RemoteCatalog::new(FsDocumentStore::new(&remote.root), remote.address.clone())
    });
    if remote.is_none() {
        info!("No remote catalog configured; adding plants is disabled");
    }

    add_session_plugins(
        &mut app,
        SessionParts {
            store: LocalStore::new(DirectoryStore::new(&settings.store_dir)),
            catalog: CatalogSource::File(settings.catalog.clone()),
            remote,
            rng: GardenRng::from_entropy(),
        },
    );

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    if let Err(e) = run_session(&mut app, stdin.lock(), stdout.lock()) {
        error!("Session I/O failed: {e}");
        std::process::exit(1);
    }
}
