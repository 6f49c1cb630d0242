use std::sync::Arc;

use parking_lot::RwLock;
use rand::distributions::Alphanumeric;
use rand::Rng;

use crate::common::AUTO_ID_LENGTH;

pub type Atomic<T> = Arc<RwLock<T>>;

#[inline]
pub fn atomic<T>(t: T) -> Atomic<T> {
    Arc::new(RwLock::new(t))
}

/// Generates a document id the way Firestore client libraries do: 20 random
/// alphanumeric characters.
pub fn generate_auto_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(AUTO_ID_LENGTH)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn atomic_wraps_value() {
        let value = atomic(5);
        *value.write() += 1;
        assert_eq!(*value.read(), 6);
    }

    #[test]
    fn auto_id_is_alphanumeric() {
        let id = generate_auto_id();
        assert_eq!(id.len(), AUTO_ID_LENGTH);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn auto_ids_differ() {
        assert_ne!(generate_auto_id(), generate_auto_id());
    }
}
