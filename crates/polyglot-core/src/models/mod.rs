mod ids;
mod language;
mod recipient;
mod translation;

pub use ids::*;
pub use language::*;
pub use recipient::*;
pub use translation::*;
