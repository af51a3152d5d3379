use std::convert::TryFrom;

use tracing::{debug, warn};

use crate::cpu::Um;
use crate::trap::UmError;

const WORD_BYTES: usize = 4;

/// Groups an image into big-endian words. Trailing bytes that do not fill a
/// whole word are dropped.
pub fn words(image: &[u8]) -> impl Iterator<Item = u32> + '_ {
    image.chunks_exact(WORD_BYTES).map(|chunk| {
        let bytes = <[u8; WORD_BYTES]>::try_from(chunk).unwrap_or([0; WORD_BYTES]);
        u32::from_be_bytes(bytes)
    })
}

/// Builds a machine with `image` loaded into segment 0.
pub fn load(image: &[u8]) -> Result<Um, UmError> {
    let trailing = image.len() % WORD_BYTES;
    if trailing != 0 {
        warn!("ignoring {} trailing bytes of program image", trailing);
    }
    let count = u32::try_from(image.len() / WORD_BYTES)
        .map_err(|_| UmError::AllocationFailure(u32::MAX))?;

    let mut um = Um::new(count)?;
    for (index, word) in words(image).enumerate() {
        um.populate(index as u32, word)?;
    }
    debug!("loaded {} program words", count);
    Ok(um)
}
