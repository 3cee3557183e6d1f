//! How submitted jobs are started.

/// Job launch policy, selected once per table.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Launcher {
    /// Run each job as an OS process on a worker thread.
    #[default]
    Process,
    /// Start nothing; results arrive through `JobTable::on_complete`.
    ///
    /// For hosts that manage processes themselves, and for tests.
    Manual,
}

impl Launcher {
    /// Whether the table spawns processes itself.
    #[inline]
    pub fn spawns_processes(self) -> bool {
        matches!(self, Self::Process)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_spawns_processes() {
        assert!(Launcher::default().spawns_processes());
        assert!(!Launcher::Manual.spawns_processes());
    }
}
