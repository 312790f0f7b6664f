//! Session protocol types for the headless garden binary.
//!
//! Defines the newline-delimited JSON command/response envelope that a
//! front end (or a script, or a test) uses to drive a garden session over
//! stdin/stdout. The types live here so they can be unit-tested without the
//! app binary; the I/O loop lives in `crates/app/src/session.rs`.

use serde::{Deserialize, Serialize};

use crate::garden_actions::{ActionResult, GardenAction};
use crate::layout::PlacedPlant;
use crate::notifications::Notification;
use crate::plant_catalog::PlantDefinition;

// ---------------------------------------------------------------------------
// Commands (stdin → session)
// ---------------------------------------------------------------------------

/// One line of stdin. The `cmd` field is the discriminator tag.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd")]
pub enum SessionCommand {
    /// List the plant catalog.
    #[serde(rename = "catalog")]
    Catalog,

    /// Return the current layout.
    #[serde(rename = "layout")]
    Layout,

    /// Execute a single layout action.
    #[serde(rename = "act")]
    Act { action: GardenAction },

    /// Execute several layout actions in order.
    #[serde(rename = "batch_act")]
    BatchAct { actions: Vec<GardenAction> },

    /// Export the layout. Without a path the document is returned inline.
    #[serde(rename = "export")]
    Export {
        #[serde(default)]
        path: Option<String>,
    },

    /// Replace the layout with a previously exported file.
    #[serde(rename = "import")]
    Import { path: String },

    /// Append a plant definition to the remote catalog.
    #[serde(rename = "add_plant")]
    AddPlant { plant: PlantDefinition },

    /// Store the remote catalog access token.
    #[serde(rename = "set_credential")]
    SetCredential { token: String },

    /// Drain pending user-facing notifications.
    #[serde(rename = "notifications")]
    Notifications,

    #[serde(rename = "quit")]
    Quit,
}

// ---------------------------------------------------------------------------
// Responses (session → stdout)
// ---------------------------------------------------------------------------

/// Every response includes the protocol version and a tagged payload.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub protocol_version: u32,
    #[serde(flatten)]
    pub payload: ResponsePayload,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum ResponsePayload {
    #[serde(rename = "ready")]
    Ready,

    #[serde(rename = "catalog")]
    Catalog { plants: Vec<PlantDefinition> },

    #[serde(rename = "layout")]
    Layout { plants: Vec<PlacedPlant> },

    #[serde(rename = "action_result")]
    ActionResult { result: ActionResult },

    #[serde(rename = "batch_result")]
    BatchResult { results: Vec<ActionResult> },

    /// `path` is set when the document was written to disk.
    #[serde(rename = "exported")]
    Exported {
        path: Option<String>,
        document: String,
    },

    /// The remote catalog accepted the new plant.
    #[serde(rename = "plant_added")]
    PlantAdded { id: String },

    /// A remote append needs a credential; call `set_credential` first.
    #[serde(rename = "credential_required")]
    CredentialRequired,

    #[serde(rename = "notifications")]
    Notifications { items: Vec<Notification> },

    #[serde(rename = "ok")]
    Ok,

    /// `conflict` is set when the remote document changed underneath us.
    #[serde(rename = "error")]
    Error {
        message: String,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        conflict: bool,
    },

    #[serde(rename = "goodbye")]
    Goodbye,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Current protocol version. Bump when the command/response schema changes.
pub const PROTOCOL_VERSION: u32 = 1;

pub fn make_response(payload: ResponsePayload) -> SessionResponse {
    SessionResponse {
        protocol_version: PROTOCOL_VERSION,
        payload,
    }
}

pub fn error_response(message: impl Into<String>) -> SessionResponse {
    make_response(ResponsePayload::Error {
        message: message.into(),
        conflict: false,
    })
}
