use thiserror::Error;

use crate::error::CodecError;

/// API misuse signals from the outcome accessors.
///
/// These mark contract violations of the codec API itself (asking a batch
/// result for its single item, unwrapping an invalid element, and so on).
/// They are deliberately a different type than [`CodecError`] and never
/// cross the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("item is not valid")]
    ItemNotValid,
    #[error("item is valid, it carries no error")]
    ItemWasValid,
    #[error("result holds no message")]
    Empty,
    #[error("expected a single message, result is a batch")]
    NotSingle,
    #[error("expected a batch, result is a single message")]
    NotBatch,
}

/// Per-message decode outcome.
///
/// A malformed batch element becomes `Invalid` without discarding its
/// siblings; the carried [`CodecError`] says why the element was rejected.
#[derive(Debug, Clone)]
pub enum Item<T> {
    Valid(T),
    Invalid(CodecError),
}

impl<T> Item<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, Item::Valid(_))
    }

    /// Borrows the decoded message, or reports misuse if the item is invalid.
    pub fn value(&self) -> Result<&T, UsageError> {
        match self {
            Item::Valid(value) => Ok(value),
            Item::Invalid(_) => Err(UsageError::ItemNotValid),
        }
    }

    pub fn into_value(self) -> Result<T, UsageError> {
        match self {
            Item::Valid(value) => Ok(value),
            Item::Invalid(_) => Err(UsageError::ItemNotValid),
        }
    }

    /// Borrows the decode failure, or reports misuse if the item is valid.
    pub fn error(&self) -> Result<&CodecError, UsageError> {
        match self {
            Item::Valid(_) => Err(UsageError::ItemWasValid),
            Item::Invalid(err) => Ok(err),
        }
    }

    pub fn ok(self) -> Option<T> {
        match self {
            Item::Valid(value) => Some(value),
            Item::Invalid(_) => None,
        }
    }
}

/// Per-call decode outcome: nothing, one message, or an ordered batch.
///
/// Immutable once produced. A batch always has as many items as the source
/// JSON array had elements, invalid ones included.
#[derive(Debug, Clone)]
pub enum Data<T> {
    Empty,
    Single(Item<T>),
    Batch(Vec<Item<T>>),
}

impl<T> Data<T> {
    pub fn is_empty(&self) -> bool {
        matches!(self, Data::Empty)
    }

    pub fn is_batch(&self) -> bool {
        matches!(self, Data::Batch(_))
    }

    /// Number of items: 0, 1, or the batch length.
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// All items as a slice, regardless of shape.
    pub fn as_slice(&self) -> &[Item<T>] {
        match self {
            Data::Empty => &[],
            Data::Single(item) => std::slice::from_ref(item),
            Data::Batch(items) => items,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item<T>> {
        self.as_slice().iter()
    }

    /// The single item, or misuse if the result is empty or a batch.
    pub fn single(&self) -> Result<&Item<T>, UsageError> {
        match self {
            Data::Empty => Err(UsageError::Empty),
            Data::Single(item) => Ok(item),
            Data::Batch(_) => Err(UsageError::NotSingle),
        }
    }

    pub fn into_single(self) -> Result<Item<T>, UsageError> {
        match self {
            Data::Empty => Err(UsageError::Empty),
            Data::Single(item) => Ok(item),
            Data::Batch(_) => Err(UsageError::NotSingle),
        }
    }

    /// The batch items, or misuse if the result is empty or single.
    pub fn batch_items(&self) -> Result<&[Item<T>], UsageError> {
        match self {
            Data::Empty => Err(UsageError::Empty),
            Data::Single(_) => Err(UsageError::NotBatch),
            Data::Batch(items) => Ok(items),
        }
    }

    pub fn into_batch(self) -> Result<Vec<Item<T>>, UsageError> {
        match self {
            Data::Empty => Err(UsageError::Empty),
            Data::Single(_) => Err(UsageError::NotBatch),
            Data::Batch(items) => Ok(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_accessors() {
        let valid: Item<i32> = Item::Valid(7);
        assert!(valid.is_valid());
        assert_eq!(valid.value().unwrap(), &7);
        assert_eq!(valid.error().unwrap_err(), UsageError::ItemWasValid);

        let invalid: Item<i32> = Item::Invalid(CodecError::Structural("broken".into()));
        assert!(!invalid.is_valid());
        assert_eq!(invalid.value().unwrap_err(), UsageError::ItemNotValid);
        assert!(matches!(
            invalid.error().unwrap(),
            CodecError::Structural(_)
        ));
    }

    #[test]
    fn test_single_accessors() {
        let single: Data<i32> = Data::Single(Item::Valid(1));
        assert!(!single.is_batch());
        assert!(!single.is_empty());
        assert_eq!(single.len(), 1);
        assert_eq!(single.single().unwrap().value().unwrap(), &1);
        assert_eq!(single.batch_items().unwrap_err(), UsageError::NotBatch);
    }

    #[test]
    fn test_batch_accessors() {
        let batch: Data<i32> = Data::Batch(vec![
            Item::Valid(1),
            Item::Invalid(CodecError::Structural("bad".into())),
        ]);
        assert!(batch.is_batch());
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.single().unwrap_err(), UsageError::NotSingle);
        assert_eq!(batch.batch_items().unwrap().len(), 2);
        assert_eq!(batch.iter().filter(|item| item.is_valid()).count(), 1);
    }

    #[test]
    fn test_empty_accessors() {
        let empty: Data<i32> = Data::Empty;
        assert!(empty.is_empty());
        assert_eq!(empty.len(), 0);
        assert_eq!(empty.single().unwrap_err(), UsageError::Empty);
        assert_eq!(empty.batch_items().unwrap_err(), UsageError::Empty);
    }
}
