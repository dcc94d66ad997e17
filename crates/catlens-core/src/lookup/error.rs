//! Lookup error taxonomy. Display strings are what the message protocol reports.

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// Disabled, or a required setting is empty. No request is made.
    #[error("Config not complete or extension disabled.")]
    NotReady,
    /// A field-path setting has characters outside the allowed set. No request is made.
    #[error("Invalid field paths in config.")]
    InvalidFieldPaths,
    /// The id list is not a JSON array. No request is made.
    #[error("Invalid IDs format.")]
    InvalidIds,
    /// Unexpected failure mid-lookup (undecodable response, storage, task join).
    /// Reported generically; the source is logged.
    #[error("Lookup failed")]
    Failed(#[source] anyhow::Error),
}
