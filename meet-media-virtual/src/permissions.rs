//! Simulated capture permission prompts.
//!
//! A kind in `Prompt` state is resolved by the configured prompt response the
//! first time it is requested; `Granted` and `Denied` are sticky, as with a
//! browser's per-origin permission.

use meet_media_core::PermissionState;

/// How the simulated user answers a permission prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PromptResponse {
    #[default]
    Accept,
    Deny,
}

/// Resolve a permission state for a capture request.
pub fn resolve(state: PermissionState, response: PromptResponse) -> PermissionState {
    match (state, response) {
        (PermissionState::Prompt, PromptResponse::Accept) => PermissionState::Granted,
        (PermissionState::Prompt, PromptResponse::Deny) => PermissionState::Denied,
        (settled, _) => settled,
    }
}
