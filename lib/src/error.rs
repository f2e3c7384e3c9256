use thiserror::Error;

/// Rejections reported to callers. A rejected operation never mutates the
/// tree.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum TreeError {
    #[error("Value is outside the accepted key domain")]
    OutOfRange = 0,
    #[error("Value is already present in the tree")]
    Duplicate = 1,
    #[error("Value is not present in the tree")]
    NotFound = 2,
    #[error("Another operation is paused mid-fixup")]
    OperationPending = 3,
    #[error("No fixup step is pending")]
    NothingPending = 4,
    #[error("Index does not refer to an empty slot in the tree")]
    NotASentinel = 5,
    #[error("No value fits between the neighbors of this slot")]
    NoRoomForInsert = 6,
    #[error("Node storage is exhausted")]
    CapacityExceeded = 7,
}

impl TreeError {
    /// Validation errors are the caller's fault, everything else is about
    /// the state of the tree.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            TreeError::OutOfRange | TreeError::Duplicate | TreeError::NotFound
        )
    }
}

impl From<TreeError> for u32 {
    fn from(e: TreeError) -> Self {
        e as u32
    }
}

pub type TreeResult<T = ()> = Result<T, TreeError>;

#[test]
fn test_error_codes() {
    assert_eq!(u32::from(TreeError::OutOfRange), 0);
    assert_eq!(u32::from(TreeError::CapacityExceeded), 7);
    assert!(TreeError::Duplicate.is_validation());
    assert!(!TreeError::OperationPending.is_validation());
}
