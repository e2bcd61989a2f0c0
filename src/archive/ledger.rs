use crate::error::ArchiveError;
use indexmap::IndexMap;

/// Outcome of claiming an entry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// The name was free and now belongs to the source; write the entry.
    New,
    /// The same source already owns the name; nothing to write.
    Existing,
}

/// Tracks which source owns each archive entry name.
#[derive(Debug, Clone, Default)]
pub struct EntryLedger {
    entries: IndexMap<String, String>,
}

impl EntryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `name` for `source`. Re-adding the same source is idempotent; a
    /// different source for a taken name is a duplicate.
    pub fn claim(&mut self, name: &str, source: &str) -> Result<Claim, ArchiveError> {
        match self.entries.get(name) {
            Some(owner) if owner == source => Ok(Claim::Existing),
            Some(_) => Err(ArchiveError::Duplicate(name.to_string())),
            None => {
                self.entries.insert(name.to_string(), source.to_string());
                Ok(Claim::New)
            }
        }
    }

    /// Gives up a name whose entry could not be written.
    pub fn release(&mut self, name: &str) {
        self.entries.shift_remove(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_new_then_existing() {
        let mut ledger = EntryLedger::new();
        assert_eq!(ledger.claim("a/b.xml", "/tmp/b.xml").unwrap(), Claim::New);
        assert_eq!(ledger.claim("a/b.xml", "/tmp/b.xml").unwrap(), Claim::Existing);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_claim_duplicate_from_other_source() {
        let mut ledger = EntryLedger::new();
        ledger.claim("a/b.xml", "/tmp/b.xml").unwrap();

        let err = ledger.claim("a/b.xml", "/opt/b.xml").unwrap_err();
        assert!(matches!(err, ArchiveError::Duplicate(name) if name == "a/b.xml"));
    }

    #[test]
    fn test_release() {
        let mut ledger = EntryLedger::new();
        ledger.claim("a/b.xml", "/tmp/b.xml").unwrap();
        ledger.release("a/b.xml");

        assert!(!ledger.contains("a/b.xml"));
        assert!(ledger.is_empty());
    }
}
