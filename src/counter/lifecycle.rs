use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use serde::{Deserialize, Serialize};

/// Lifecycle of an event counter: `Created -> Open -> Closed`.
///
/// Recording and querying are only valid while `Open`. Both transitions are single-shot;
/// `Closed` is terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Lifecycle {
    Created = 0,
    Open = 1,
    Closed = 2,
}

impl Lifecycle {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => Lifecycle::Created,
            1 => Lifecycle::Open,
            _ => Lifecycle::Closed,
        }
    }
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Lifecycle::Created => "created",
            Lifecycle::Open => "open",
            Lifecycle::Closed => "closed",
        };
        f.write_str(name)
    }
}

/// Lock-free cell holding a [`Lifecycle`], read on every public counter operation.
#[derive(Debug)]
pub(crate) struct LifecycleCell {
    state: AtomicU8,
}

impl LifecycleCell {
    pub(crate) fn new() -> Self {
        LifecycleCell {
            state: AtomicU8::new(Lifecycle::Created as u8),
        }
    }

    pub(crate) fn get(&self) -> Lifecycle {
        Lifecycle::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Moves `from -> to`. On failure returns the state actually observed.
    pub(crate) fn transition(&self, from: Lifecycle, to: Lifecycle) -> Result<(), Lifecycle> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(Lifecycle::from_u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_created() {
        let cell = LifecycleCell::new();
        assert_eq!(cell.get(), Lifecycle::Created);
    }

    #[test]
    fn transitions_are_single_shot() {
        let cell = LifecycleCell::new();
        assert_eq!(cell.transition(Lifecycle::Created, Lifecycle::Open), Ok(()));
        assert_eq!(cell.transition(Lifecycle::Created, Lifecycle::Open), Err(Lifecycle::Open));
        assert_eq!(cell.transition(Lifecycle::Open, Lifecycle::Closed), Ok(()));
        assert_eq!(cell.transition(Lifecycle::Open, Lifecycle::Closed), Err(Lifecycle::Closed));
        assert_eq!(cell.get(), Lifecycle::Closed);
    }

    #[test]
    fn displays_lowercase_names() {
        assert_eq!(Lifecycle::Created.to_string(), "created");
        assert_eq!(Lifecycle::Open.to_string(), "open");
        assert_eq!(Lifecycle::Closed.to_string(), "closed");
    }
}
