use chrono::Utc;
use uuid::Uuid;

/// Source of fresh event ids.
///
/// Any `FnMut() -> String` is a generator, so callers can inject a fixed sequence.
pub trait IdGenerator {
    fn next_id(&mut self) -> String;
}

impl<F> IdGenerator for F
where
    F: FnMut() -> String,
{
    fn next_id(&mut self) -> String {
        self()
    }
}

/// Wall-clock milliseconds followed by nine random hex characters
pub fn timestamp_id() -> String {
    let random = Uuid::new_v4().simple().to_string();
    format!("{}{}", Utc::now().timestamp_millis(), &random[..9])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timestamp_ids_are_unique() {
        let a = timestamp_id();
        let b = timestamp_id();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
        assert!(!a.contains('@'));
    }

    #[test]
    fn test_closure_is_a_generator() {
        let mut n = 0;
        let mut ids = || {
            n += 1;
            format!("id-{}", n)
        };
        assert_eq!(ids.next_id(), "id-1");
        assert_eq!(ids.next_id(), "id-2");
    }
}
