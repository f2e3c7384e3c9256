/// Exclusive lower bound of the classic demo key domain.
pub const DEFAULT_MIN: u32 = 0;
/// Exclusive upper bound of the classic demo key domain.
pub const DEFAULT_MAX: u32 = 1000;
/// Rows produced by a default level order enumeration, enough for a
/// 63 slot display.
pub const DEFAULT_MAX_LEVELS: usize = 6;
