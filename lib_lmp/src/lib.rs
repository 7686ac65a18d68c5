pub mod codec;
pub mod constants;
pub mod image;
pub mod palette;
pub mod quantize;

use log::*;
use std::io::Write;

pub use crate::codec::{decode_to_rgba, encode_from_rgba, CodecError, RgbaImage};
pub use crate::image::{
    decode, encode, read_posts, to_rgba, EncodingError, FormatError, Header, Image, Post,
};
pub use crate::palette::{Palette, PaletteError, PaletteSelection, DEFAULT_PALETTE};
pub use crate::quantize::{quantize, ColorApproximationMode, Quantize};

/// Installs the global logger, writing to stderr.
///
/// `level` applies to this library and the command line tool; `RUST_LOG`
/// directives are layered on top. Calling it twice is harmless.
pub fn init_logging(level: LevelFilter) {
    let result = env_logger::Builder::new()
        .target(env_logger::Target::Stderr)
        .filter(Some("lib_lmp"), level)
        .filter(Some("lmp_tool"), level)
        .parse_env("RUST_LOG")
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}:{}] {}",
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .try_init();

    if result.is_err() {
        debug!("Logger already initialized");
    }
}
