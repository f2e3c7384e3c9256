use std::mem::size_of;

use crate::error::TreeError;

pub type DataIndex = u32;

/// Marker trait to emit warnings when using get_helper on the Value type
/// rather than on RBNode<Value>
pub trait Get: bytemuck::Pod {}

/// Read a struct of type T in an array of data at a given index.
pub fn get_helper<T: Get>(data: &[u8], index: DataIndex) -> &T {
    let index_usize: usize = index as usize;
    bytemuck::from_bytes(&data[index_usize..index_usize + size_of::<T>()])
}

/// Read a struct of type T in an array of data at a given index.
pub fn get_mut_helper<T: Get>(data: &mut [u8], index: DataIndex) -> &mut T {
    let index_usize: usize = index as usize;
    bytemuck::from_bytes_mut(&mut data[index_usize..index_usize + size_of::<T>()])
}

/// The standard `bool` is not a `Pod`, define a replacement that is
/// https://docs.rs/spl-pod/latest/src/spl_pod/primitives.rs.html#13
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(transparent)]
pub struct PodBool(pub u8);
impl PodBool {
    pub const fn from_bool(b: bool) -> Self {
        Self(if b { 1 } else { 0 })
    }

    pub const fn is_true(&self) -> bool {
        self.0 != 0
    }
}

impl From<bool> for PodBool {
    fn from(b: bool) -> Self {
        Self::from_bool(b)
    }
}

impl From<PodBool> for bool {
    fn from(b: PodBool) -> Self {
        b.is_true()
    }
}

/// Returns `Err(err)` and traces `msg` with the caller location when `v` is
/// false.
#[track_caller]
#[inline(always)]
pub fn require(v: bool, err: TreeError, msg: &str) -> Result<(), TreeError> {
    if v {
        Ok(())
    } else {
        let caller: &std::panic::Location<'_> = std::panic::Location::caller();
        crate::trace!("{}. {} ({})", msg, err, caller);
        #[cfg(not(feature = "trace"))]
        let _ = (msg, caller);
        Err(err)
    }
}

#[test]
fn test_pod_bool() {
    assert_eq!(PodBool::from_bool(false).0 == 1, false);
    assert_eq!(PodBool::from(false).0 == 1, false);
    assert!(bool::from(PodBool::from(true)));
}

#[test]
fn test_require() {
    assert_eq!(require(true, TreeError::NotFound, "unused"), Ok(()));
    assert_eq!(
        require(false, TreeError::NotFound, "Value missing"),
        Err(TreeError::NotFound)
    );
}

#[macro_export]
macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "trace")]
        {
            log::trace!("[{}:{}] {}", std::file!(), std::line!(), std::format_args!($($arg)*));
        }
    };
}
