//! Translation keys: namespace rules and the text-to-key map.

pub mod key_map;
pub mod namespace;

pub use key_map::TextToKeyMap;
pub use namespace::{detect_namespace, infer_namespace};
