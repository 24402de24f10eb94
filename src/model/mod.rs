pub mod candidate;
pub mod catalog;
pub mod session;

pub use candidate::{Candidate, ImageVariant, PhotoUrls};
pub use catalog::{Category, Condition, TimeOfDay};
pub use session::SessionState;
