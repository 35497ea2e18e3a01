pub mod class;
pub mod endpoint;
pub mod module;
pub mod resource;
pub mod wiring;

pub use class::*;
pub use endpoint::*;
pub use module::*;
pub use resource::*;
pub use wiring::*;
