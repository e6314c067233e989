pub mod batch;
pub mod conversion;
pub mod node;

pub use batch::*;
pub use conversion::*;
pub use node::*;
