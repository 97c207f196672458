//! Checkpoint tracking for end-of-run state emission.
//!
//! A checkpoint is only worth emitting if no record has been written after
//! it: an appended row invalidates the pending value until a new STATE
//! message arrives. The pipeline holds one [`Checkpoint`] per run and hands
//! back whatever is still standing at EOF.

use serde_json::Value;

/// The last-standing STATE value seen by the pipeline.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checkpoint {
    pending: Option<Value>,
}

impl Checkpoint {
    /// Create a checkpoint with no pending value.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the pending value with the latest STATE payload.
    ///
    /// A JSON `null` payload clears the checkpoint: the emission contract
    /// cannot distinguish a null checkpoint from an absent one.
    pub fn set(&mut self, value: Value) {
        self.pending = match value {
            Value::Null => None,
            value => Some(value),
        };
    }

    /// Drop the pending value after a record has reached disk.
    pub fn invalidate(&mut self) {
        self.pending = None;
    }

    /// The pending value, if any.
    pub fn pending(&self) -> Option<&Value> {
        self.pending.as_ref()
    }

    /// Consume the checkpoint, yielding the value to emit.
    pub fn into_pending(self) -> Option<Value> {
        self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_checkpoint_starts_empty() {
        assert_eq!(Checkpoint::new().pending(), None);
    }

    #[test]
    fn test_last_state_wins() {
        let mut checkpoint = Checkpoint::new();
        checkpoint.set(json!({"bookmark": 1}));
        checkpoint.set(json!({"bookmark": 2}));

        assert_eq!(checkpoint.into_pending(), Some(json!({"bookmark": 2})));
    }

    #[test]
    fn test_invalidate_clears_pending() {
        let mut checkpoint = Checkpoint::new();
        checkpoint.set(json!({"bookmark": 1}));
        checkpoint.invalidate();

        assert_eq!(checkpoint.pending(), None);
    }

    #[test]
    fn test_state_after_invalidate_stands() {
        let mut checkpoint = Checkpoint::new();
        checkpoint.set(json!({"bookmark": 1}));
        checkpoint.invalidate();
        checkpoint.set(json!({"bookmark": 2}));

        assert_eq!(checkpoint.into_pending(), Some(json!({"bookmark": 2})));
    }

    #[test]
    fn test_null_state_clears_pending() {
        let mut checkpoint = Checkpoint::new();
        checkpoint.set(json!({"bookmark": 1}));
        checkpoint.set(Value::Null);

        assert_eq!(checkpoint.pending(), None);
    }

    #[test]
    fn test_non_object_state_values_are_kept() {
        let mut checkpoint = Checkpoint::new();
        checkpoint.set(json!(42));

        assert_eq!(checkpoint.into_pending(), Some(json!(42)));
    }
}
