/// Samples were read until the requested count, or the user stopped us
pub const SUCCESS: i32 = 0;
/// Engine could not start or output failed
pub const FAILURE: i32 = 1;
/// Configuration file missing or malformed
pub const CONFIG: i32 = 2;
