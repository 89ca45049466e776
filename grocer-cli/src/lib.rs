pub mod session;
pub mod invoice;

pub use session::{CheckoutSession, InputIssue};
pub use invoice::render;
