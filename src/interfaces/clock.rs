/// Source of wall-clock time at one-second resolution.
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    /// Whole seconds since the Unix epoch.
    fn epoch_seconds(&self) -> u64;
}
