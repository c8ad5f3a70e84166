pub mod types;
pub mod metadata;
pub mod values;
pub mod sections;
pub mod medications;

pub use types::*;
pub use metadata::*;
pub use values::*;
pub use sections::*;
pub use medications::*;
