//! Image loader: translates a big-endian on-disk program image into the
//! host-native in-memory representation.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

use byteorder::{BigEndian, ReadBytesExt};
use log::info;

use crate::error::Error;
use crate::state::memory::Memory;

/// Loads the image at `path` into `memory`, returning the origin address
/// (also the initial PC). The first word on disk is the origin; every word
/// after it is written starting there, stopping at EOF or at the top of the
/// address space, whichever comes first.
pub fn load_image(path: impl AsRef<Path>, memory: &mut Memory) -> Result<u16, Error> {
    let mut reader = BufReader::new(File::open(path)?);

    let origin = match reader.read_u16::<BigEndian>() {
        Ok(word) => word,
        Err(err) if err.kind() == ErrorKind::UnexpectedEof => return Err(Error::EmptyImage),
        Err(err) => return Err(Error::Image(err)),
    };

    let mut address = origin;
    let mut words_loaded = 0u32;

    loop {
        match reader.read_u16::<BigEndian>() {
            Ok(word) => {
                memory.write(address, word);
                words_loaded += 1;

                if address == u16::max_value() {
                    break;
                }
                address = address.wrapping_add(1);
            }
            Err(err) if err.kind() == ErrorKind::UnexpectedEof => break,
            Err(err) => return Err(Error::Image(err)),
        }
    }

    info!("loaded {} words at origin {:#06x}", words_loaded, origin);

    Ok(origin)
}
