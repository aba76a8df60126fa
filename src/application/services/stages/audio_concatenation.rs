use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncSeekExt, AsyncWriteExt, BufWriter};

use crate::domain::{WAV_HEADER_LEN, WavHeader};

use super::{PipelineError, RunContext, StageFlow, StageHandler};

pub struct AudioConcatenation {
    merged_file_name: String,
}

impl AudioConcatenation {
    pub fn new(merged_file_name: String) -> Self {
        Self { merged_file_name }
    }
}

#[async_trait]
impl StageHandler for AudioConcatenation {
    async fn execute(&self, ctx: &mut RunContext) -> Result<StageFlow, PipelineError> {
        let dir = ctx
            .workspace
            .as_ref()
            .map(|w| w.path().to_path_buf())
            .ok_or(PipelineError::MissingArtifact("chunk workspace"))?;
        let output = dir.join(&self.merged_file_name);

        let size = concatenate_wav(&ctx.chunk_paths, &output).await?;
        tracing::info!(chunks = ctx.chunk_paths.len(), bytes = size, "Audio concatenated");

        ctx.merged_audio = Some(output);
        Ok(StageFlow::Continue)
    }
}

/// Merges WAV chunks into `output`, returning the size of the merged file.
///
/// A single chunk is copied as-is. Otherwise the first chunk's header is
/// reused with its RIFF and data lengths rewritten, followed by every chunk's
/// PCM payload in the given order.
pub async fn concatenate_wav(chunks: &[PathBuf], output: &Path) -> Result<u64, PipelineError> {
    let Some(first) = chunks.first() else {
        return Err(PipelineError::NoUsableChunks);
    };

    if chunks.len() == 1 {
        let size = tokio::fs::copy(first, output).await?;
        tracing::debug!(bytes = size, "Single chunk copied");
        return Ok(size);
    }

    let header = read_header(first).await?;
    tracing::debug!(
        channels = header.channels,
        sample_rate = header.sample_rate,
        bits_per_sample = header.bits_per_sample,
        "Audio format"
    );
    if !header.has_data_tag {
        tracing::warn!("Expected data sub-chunk at offset 36, header may be incorrect");
    }

    let mut payloads = Vec::with_capacity(chunks.len());
    let mut payload_len = 0u64;
    for chunk in chunks {
        let size = tokio::fs::metadata(chunk).await?.len();
        if size < WAV_HEADER_LEN as u64 {
            tracing::warn!(chunk = %chunk.display(), size, "Chunk smaller than WAV header, skipping");
            continue;
        }
        payload_len += size - WAV_HEADER_LEN as u64;
        payloads.push(chunk);
    }
    if payloads.is_empty() {
        return Err(PipelineError::NoUsableChunks);
    }

    let data_len = u32::try_from(payload_len).map_err(|_| {
        PipelineError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("merged payload of {} bytes exceeds WAV limit", payload_len),
        ))
    })?;

    let mut writer = BufWriter::new(File::create(output).await?);
    writer.write_all(&header.with_payload_len(data_len)).await?;

    let mut offset = WAV_HEADER_LEN as u64;
    for chunk in payloads {
        let mut reader = File::open(chunk).await?;
        reader
            .seek(std::io::SeekFrom::Start(WAV_HEADER_LEN as u64))
            .await?;
        offset += tokio::io::copy(&mut reader, &mut writer).await?;
    }
    writer.flush().await?;

    Ok(offset)
}

async fn read_header(path: &Path) -> Result<WavHeader, PipelineError> {
    let owned = path.to_path_buf();
    let parsed = tokio::task::spawn_blocking(move || {
        let file = std::fs::File::open(&owned)?;
        Ok::<_, std::io::Error>(WavHeader::read(std::io::BufReader::new(file)))
    })
    .await
    .map_err(std::io::Error::other)??;

    parsed.map_err(|source| PipelineError::InvalidWavHeader {
        file: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        source,
    })
}
