pub mod error;
pub mod returns;
pub mod traits;
pub mod types;

pub use error::*;
pub use returns::*;
pub use traits::*;
pub use types::*;
