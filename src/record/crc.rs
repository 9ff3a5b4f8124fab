//! Masked CRC32C as used by the record framing.
//!
//! Checksumming data that itself embeds checksums is unreliable, so the
//! stored value is the Castagnoli CRC rotated right by 15 bits plus a
//! constant. The transform is fixed by the container format.

const MASK_DELTA: u32 = 0xa282_ead8;

/// CRC32C of `data`, masked for storage.
#[inline]
pub fn masked_crc32c(data: &[u8]) -> u32 {
    let crc = crc32c::crc32c(data);
    crc.rotate_right(15).wrapping_add(MASK_DELTA)
}

/// Recover the raw CRC32C from a stored masked value.
#[inline]
pub fn unmask_crc32c(masked: u32) -> u32 {
    masked.wrapping_sub(MASK_DELTA).rotate_left(15)
}
