use std::path::PathBuf;

/// Stand-in for a file-picker dialog: yields the path of a bank file to
/// load, or `None` when the user cancels.
pub trait PathProviderPort: Send + Sync {
    fn pick_bank(&self) -> Option<PathBuf>;
}
