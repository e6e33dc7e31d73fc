pub mod types;
pub mod parser;
pub mod overrides;
pub mod instance;
pub mod exporter;

pub use types::*;
pub use parser::*;
pub use overrides::*;
pub use instance::*;
pub use exporter::*;
