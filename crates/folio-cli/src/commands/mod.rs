//! Command implementations.

pub mod chunks;
pub mod extract;
pub mod profiles;
pub mod reset;
pub mod status;

pub use self::chunks::execute_chunks;
pub use self::extract::execute_extract;
pub use self::profiles::execute_profiles;
pub use self::reset::execute_reset;
pub use self::status::execute_status;
