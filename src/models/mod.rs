pub mod check;
pub mod language;
pub mod provider;
pub mod record;

pub use check::{numbered_requirements, CheckSpec};
pub use language::Language;
pub use provider::Provider;
pub use record::{AdditionalOutcome, ResultRecord};
