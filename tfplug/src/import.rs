//! Import helpers for simplifying resource import implementations

use crate::request::{ImportStateRequest, ImportStateResponse};
use crate::types::{Diagnostics, State};

/// Sets the import ID on a single attribute of an otherwise empty state
///
/// Example: `terraform import allquiet_team.ops 3f2b...` -> state.id = "3f2b..."
pub fn import_state_passthrough_id(
    attribute: &str,
    request: ImportStateRequest,
) -> ImportStateResponse {
    let mut diagnostics = Diagnostics::new();

    if request.id.trim().is_empty() {
        diagnostics.add_error(
            "Missing import ID",
            Some(format!(
                "Importing {} requires a non-empty identifier",
                request.type_name
            )),
        );
        return ImportStateResponse {
            state: None,
            diagnostics,
        };
    }

    let mut state = State::new();
    state.set(attribute, request.id);

    ImportStateResponse {
        state: Some(state),
        diagnostics,
    }
}
