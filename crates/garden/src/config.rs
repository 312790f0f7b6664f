/// Bed scale: screen pixels per inch of bed.
pub const PX_PER_INCH: f64 = 10.0;
/// Visual height of the bed in pixels. The upper half is lane 0, the lower half lane 1.
pub const BED_HEIGHT_PX: f64 = 200.0;
/// Nominal bed width used by presentation code. Placement does not clamp to it.
pub const BED_WIDTH_INCHES: u32 = 96;

/// Key/value store key holding the JSON-encoded layout.
pub const LAYOUT_STORAGE_KEY: &str = "garden_layout";
/// Key/value store key holding the remote catalog access token.
pub const CREDENTIAL_STORAGE_KEY: &str = "github_token";

/// Suggested filename for exported layouts.
pub const EXPORT_FILE_NAME: &str = "garden-plan.json";
