/// Configuration for an in-memory store.
///
/// ```text
/// let store = InMemoryStore::new(InMemoryStoreConfig::new().without_aggregation());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryStoreConfig {
    aggregation: bool,
    fail_after_writes: Option<u64>,
}

impl Default for InMemoryStoreConfig {
    fn default() -> Self {
        InMemoryStoreConfig::new()
    }
}

impl InMemoryStoreConfig {
    pub fn new() -> InMemoryStoreConfig {
        InMemoryStoreConfig {
            aggregation: true,
            fail_after_writes: None,
        }
    }

    /// Disables native aggregate count, like a driver predating aggregation queries.
    pub fn without_aggregation(mut self) -> InMemoryStoreConfig {
        self.aggregation = false;
        self
    }

    /// Lets `writes` write calls succeed, then fails every later one with
    /// `BackendFailure`. Each set, update, delete or commit call counts as one.
    pub fn fail_after_writes(mut self, writes: u64) -> InMemoryStoreConfig {
        self.fail_after_writes = Some(writes);
        self
    }

    pub fn aggregation(&self) -> bool {
        self.aggregation
    }

    pub fn write_budget(&self) -> Option<u64> {
        self.fail_after_writes
    }
}
