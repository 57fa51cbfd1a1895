pub mod error;
pub mod manifest;
pub mod model;
pub mod traits;

pub mod prelude {
    pub use super::error::*;
    pub use super::manifest::*;
    pub use super::model::*;
    pub use super::traits::*;
}
