// Data model shared by the codec, flattener, and significance tester.
pub mod dtype;
pub mod error;
pub mod frame;
pub mod index;
pub mod scalar;
