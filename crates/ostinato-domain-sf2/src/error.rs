use crate::riff::FourCc;

/// Malformed or truncated container/metadata.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unexpected end of data")]
    Truncated,
    #[error("not a soundfont file")]
    NotASoundFont,
    #[error("chunk {id} length {len} exceeds remaining data")]
    ChunkOverrun { id: FourCc, len: u32 },
    #[error("unexpected chunk {0}")]
    UnexpectedChunk(FourCc),
    #[error("missing chunk {0}")]
    MissingChunk(FourCc),
    #[error("chunk {id} has no terminal record")]
    MissingTerminator { id: FourCc },
    #[error("chunk {id} length {len} is not a multiple of record stride {stride}")]
    MisalignedRecords {
        id: FourCc,
        len: usize,
        stride: usize,
    },
    #[error("{table} index {index} out of bounds (table holds {len})")]
    BadTableIndex {
        table: &'static str,
        index: usize,
        len: usize,
    },
    #[error("pcm data has odd length {0}")]
    OddPcmLength(usize),
}

/// Sample offsets that fall outside the PCM block.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RangeError {
    #[error("sample '{name}' has inverted bounds ({start}..{end})")]
    InvertedBounds { name: String, start: u32, end: u32 },
    #[error("sample '{name}' bounds ({start}..{end}) exceed pcm block of {pcm_len} bytes")]
    OutOfBounds {
        name: String,
        start: u32,
        end: u32,
        pcm_len: usize,
    },
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind} index {index} out of range (count {count})")]
pub struct IndexError {
    pub kind: &'static str,
    pub index: usize,
    pub count: usize,
}

/// The instrument exists but none of its zones reference a sample.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("instrument '{instrument}' has no zone with a sample id generator")]
pub struct NotFoundError {
    pub instrument: String,
}

/// Everything that can go wrong between an instrument index and a
/// playable waveform.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error(transparent)]
    Index(#[from] IndexError),
    #[error(transparent)]
    NotFound(#[from] NotFoundError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Format(#[from] FormatError),
}
