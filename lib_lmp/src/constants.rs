pub const FORMAT_NAME: &str = "Doom picture lump";
pub const FILE_EXT: &str = "lmp";

/// Palette index that the wire format reserves for "no pixel here".
pub const TRANSPARENT_INDEX: u8 = 247;

/// Source pixels with alpha below this value are treated as transparent.
pub const ALPHA_THRESHOLD: u8 = 128;

/// Ends a column's post chain.
pub const POST_TERMINATOR: u8 = 0xFF;

/// Longest run a single post may carry.
pub const MAX_POST_LENGTH: usize = 254;

// Tall patch convention: pictures of at least 256 rows split posts at row 254
// and re-anchor the delta base there with a zero-length post.
pub const TALL_PATCH_ROW: usize = 254;
pub const TALL_PATCH_MIN_HEIGHT: usize = 256;

pub const PALETTE_COLORS: usize = 256;
pub const PALETTE_BYTES: usize = PALETTE_COLORS * 3;
