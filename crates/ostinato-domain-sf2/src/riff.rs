//! RIFF container walker for the `sfbk` form.
//!
//! Produces byte ranges into the caller's buffer; chunk payloads are never
//! copied here.

use crate::error::FormatError;
use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FourCc(pub [u8; 4]);

impl fmt::Display for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", String::from_utf8_lossy(&self.0))
    }
}

impl fmt::Debug for FourCc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FourCc({})", self)
    }
}

pub const RIFF: FourCc = FourCc(*b"RIFF");
pub const LIST: FourCc = FourCc(*b"LIST");
pub const SFBK: FourCc = FourCc(*b"sfbk");
pub const INFO: FourCc = FourCc(*b"INFO");
pub const SDTA: FourCc = FourCc(*b"sdta");
pub const PDTA: FourCc = FourCc(*b"pdta");

/// Byte range of a chunk body within the original buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkRange {
    pub offset: usize,
    pub len: usize,
}

impl ChunkRange {
    pub fn slice<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[self.offset..self.offset + self.len]
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RawChunk {
    pub id: FourCc,
    pub range: ChunkRange,
}

/// The three mandatory LIST chunks of an sfbk form, each broken into its
/// sub-chunks in file order.
#[derive(Debug, Default)]
pub struct Container {
    pub info: Vec<RawChunk>,
    pub sdta: Vec<RawChunk>,
    pub pdta: Vec<RawChunk>,
}

impl Container {
    pub fn info_chunk(&self, id: FourCc) -> Option<&RawChunk> {
        self.info.iter().find(|c| c.id == id)
    }

    pub fn sdta_chunk(&self, id: FourCc) -> Option<&RawChunk> {
        self.sdta.iter().find(|c| c.id == id)
    }

    pub fn pdta_chunk(&self, id: FourCc) -> Result<&RawChunk, FormatError> {
        self.pdta
            .iter()
            .find(|c| c.id == id)
            .ok_or(FormatError::MissingChunk(id))
    }
}

struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn fourcc(&mut self) -> Result<FourCc, FormatError> {
        if self.remaining() < 4 {
            return Err(FormatError::Truncated);
        }
        let bytes = [
            self.data[self.pos],
            self.data[self.pos + 1],
            self.data[self.pos + 2],
            self.data[self.pos + 3],
        ];
        self.pos += 4;
        Ok(FourCc(bytes))
    }

    fn u32(&mut self) -> Result<u32, FormatError> {
        if self.remaining() < 4 {
            return Err(FormatError::Truncated);
        }
        let bytes = [
            self.data[self.pos],
            self.data[self.pos + 1],
            self.data[self.pos + 2],
            self.data[self.pos + 3],
        ];
        self.pos += 4;
        Ok(u32::from_le_bytes(bytes))
    }

    /// Consumes a chunk body of `len` bytes plus the RIFF pad byte for
    /// odd sizes, returning the body's range.
    fn chunk_body(&mut self, id: FourCc, len: u32) -> Result<ChunkRange, FormatError> {
        let body = len as usize;
        if body > self.remaining() {
            return Err(FormatError::ChunkOverrun { id, len });
        }
        let range = ChunkRange {
            offset: self.pos,
            len: body,
        };
        self.pos += body;
        if body % 2 == 1 && self.remaining() > 0 {
            self.pos += 1;
        }
        Ok(range)
    }
}

fn walk_subchunks(data: &[u8], list_body: ChunkRange) -> Result<Vec<RawChunk>, FormatError> {
    let mut reader = Reader::new(list_body.slice(data));
    let mut chunks = Vec::new();
    while reader.remaining() > 0 {
        let id = reader.fourcc()?;
        let len = reader.u32()?;
        let range = reader.chunk_body(id, len)?;
        chunks.push(RawChunk {
            id,
            range: ChunkRange {
                offset: list_body.offset + range.offset,
                len: range.len,
            },
        });
    }
    Ok(chunks)
}

/// Validates the RIFF/sfbk framing and indexes every sub-chunk of the
/// INFO, sdta and pdta lists.
pub fn read_container(data: &[u8]) -> Result<Container, FormatError> {
    let mut reader = Reader::new(data);

    if reader.fourcc()? != RIFF {
        return Err(FormatError::NotASoundFont);
    }
    let riff_len = reader.u32()?;
    if riff_len as usize > reader.remaining() {
        return Err(FormatError::ChunkOverrun {
            id: RIFF,
            len: riff_len,
        });
    }
    let riff_end = reader.pos + riff_len as usize;
    if reader.fourcc()? != SFBK {
        return Err(FormatError::NotASoundFont);
    }

    let mut container = Container::default();
    let mut seen = (false, false, false);
    while reader.pos < riff_end {
        let id = reader.fourcc()?;
        if id != LIST {
            return Err(FormatError::UnexpectedChunk(id));
        }
        let len = reader.u32()?;
        let body = reader.chunk_body(LIST, len)?;
        if body.len < 4 {
            return Err(FormatError::Truncated);
        }
        let form = FourCc([
            data[body.offset],
            data[body.offset + 1],
            data[body.offset + 2],
            data[body.offset + 3],
        ]);
        let inner = ChunkRange {
            offset: body.offset + 4,
            len: body.len - 4,
        };
        let chunks = walk_subchunks(data, inner)?;
        match form {
            INFO => {
                container.info = chunks;
                seen.0 = true;
            }
            SDTA => {
                container.sdta = chunks;
                seen.1 = true;
            }
            PDTA => {
                container.pdta = chunks;
                seen.2 = true;
            }
            other => return Err(FormatError::UnexpectedChunk(other)),
        }
    }

    if !seen.0 {
        return Err(FormatError::MissingChunk(INFO));
    }
    if !seen.1 {
        return Err(FormatError::MissingChunk(SDTA));
    }
    if !seen.2 {
        return Err(FormatError::MissingChunk(PDTA));
    }

    Ok(container)
}
