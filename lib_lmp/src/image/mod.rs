pub mod cursor;
pub mod decoder;
pub mod encoder;
pub mod format;

pub use decoder::{decode, read_posts, FormatError};
pub use encoder::{encode, EncodingError};
pub use format::{to_rgba, Header, Image, Post};
