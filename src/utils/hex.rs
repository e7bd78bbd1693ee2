//! Verilog `$readmemh` image export.
//!
//! Table streams are loaded into block RAM as 32-bit words. The image is the
//! stream zero-padded to a word boundary, one little-endian word per line.

use byteorder::{ByteOrder, LittleEndian};

/// Render a binary stream as a `$readmemh` text image
pub fn to_readmemh(data: &[u8]) -> String {
    let padding = (4 - data.len() % 4) % 4;
    if padding > 0 {
        log::warn!("Stream size {} is not word aligned, padding {} zero bytes", data.len(), padding);
    }

    let mut padded = data.to_vec();
    padded.resize(data.len() + padding, 0);

    let mut image = String::with_capacity(padded.len() / 4 * 9);
    for word in padded.chunks_exact(4) {
        image.push_str(&format!("{:08x}\n", LittleEndian::read_u32(word)));
    }
    image
}
