use std::io::{Cursor, Read};

pub const WAV_HEADER_LEN: usize = 44;

/// Format of a PCM WAV file plus its leading 44 header bytes, kept so the
/// size fields can be rewritten for a merged payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    pub data_len: u32,
    /// Whether the data sub-chunk starts at offset 36.
    pub has_data_tag: bool,
    raw: [u8; WAV_HEADER_LEN],
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WavHeaderError {
    #[error("header too short: {0} bytes")]
    TooShort(usize),
    #[error("malformed WAV header: {0}")]
    Malformed(String),
    #[error("failed to read WAV header: {0}")]
    Unreadable(String),
}

impl From<hound::Error> for WavHeaderError {
    fn from(err: hound::Error) -> Self {
        match err {
            hound::Error::IoError(e) => WavHeaderError::Unreadable(e.to_string()),
            other => WavHeaderError::Malformed(other.to_string()),
        }
    }
}

impl WavHeader {
    pub fn parse(bytes: &[u8]) -> Result<Self, WavHeaderError> {
        Self::read(bytes)
    }

    /// Reads the header from the start of `reader`. Only the header is
    /// consumed, never the sample data.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, WavHeaderError> {
        let mut head = Vec::with_capacity(WAV_HEADER_LEN);
        reader
            .by_ref()
            .take(WAV_HEADER_LEN as u64)
            .read_to_end(&mut head)
            .map_err(|e| WavHeaderError::Unreadable(e.to_string()))?;
        if head.len() < WAV_HEADER_LEN {
            return Err(WavHeaderError::TooShort(head.len()));
        }

        let mut raw = [0u8; WAV_HEADER_LEN];
        raw.copy_from_slice(&head);

        let wav = hound::WavReader::new(Cursor::new(head).chain(reader))?;
        let spec = wav.spec();
        let bytes_per_sample = spec.bits_per_sample.div_ceil(8);
        let data_len = wav.len().saturating_mul(u32::from(bytes_per_sample));

        Ok(Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            block_align: spec.channels * bytes_per_sample,
            bits_per_sample: spec.bits_per_sample,
            data_len,
            has_data_tag: &raw[36..40] == b"data",
            raw,
        })
    }

    /// Copy of the header rewritten for a data section of `payload_len` bytes.
    pub fn with_payload_len(&self, payload_len: u32) -> [u8; WAV_HEADER_LEN] {
        let mut out = self.raw;
        out[4..8].copy_from_slice(&payload_len.saturating_add(36).to_le_bytes());
        out[40..44].copy_from_slice(&payload_len.to_le_bytes());
        out
    }
}
