pub mod error;
pub mod raw;
pub mod traits;
pub mod types;

pub use error::*;
pub use raw::*;
pub use traits::*;
pub use types::*;
