//! Run identifiers for pipeline batches

use std::fmt;

/// Unique identifier for one pipeline run, based on UUIDv7
///
/// UUIDv7 sorts chronologically, so a run started later always compares
/// greater. The category store relies on that to refuse results from a run
/// older than the one it already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RunId(u128);

impl RunId {
    /// Generate a new UUIDv7-based RunId
    ///
    /// # Examples
    ///
    /// ```
    /// use nfse_domain::RunId;
    ///
    /// let first = RunId::new();
    /// let second = RunId::new();
    /// assert!(first <= second);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a RunId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }

    /// Milliseconds since the Unix epoch at which the run was started
    pub fn timestamp(&self) -> u64 {
        // UUIDv7: top 48 bits are the Unix millisecond timestamp
        (self.0 >> 80) as u64
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_id_chronological() {
        let first = RunId::new();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = RunId::new();

        assert!(first < second);
        assert!(first.timestamp() <= second.timestamp());
    }

    #[test]
    fn test_run_id_display() {
        let id = RunId::new();
        assert_eq!(id.to_string().len(), 36);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Ordering of run ids matches ordering of their raw values
        #[test]
        fn test_run_id_ordering_property(a: u128, b: u128) {
            let id_a = RunId::from_value(a);
            let id_b = RunId::from_value(b);

            prop_assert_eq!(id_a < id_b, a < b);
            prop_assert_eq!(id_a == id_b, a == b);
        }
    }
}
