// tagsmith/src/transport/mod.rs

//! Platform tag technology seams and their in-memory mocks.

pub mod mock;
pub mod traits;

pub use mock::{MockMifareTag, MockNtagTag, MockTag};
pub use traits::{DetectedTag, MifareClassicTech, NfcATech, TagConnection};
