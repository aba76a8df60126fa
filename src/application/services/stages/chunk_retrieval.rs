use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::ObjectStorage;

use super::{PipelineError, RunContext, StageFlow, StageHandler};

pub struct ChunkRetrieval {
    storage: Arc<dyn ObjectStorage>,
    temp_root: PathBuf,
    merged_file_name: String,
}

impl ChunkRetrieval {
    pub fn new(
        storage: Arc<dyn ObjectStorage>,
        temp_root: PathBuf,
        merged_file_name: String,
    ) -> Self {
        Self {
            storage,
            temp_root,
            merged_file_name,
        }
    }
}

#[async_trait]
impl StageHandler for ChunkRetrieval {
    async fn execute(&self, ctx: &mut RunContext) -> Result<StageFlow, PipelineError> {
        let location = ctx.session.location.clone();
        let expected = ctx.session.expected_chunks as usize;

        let mut chunks: Vec<_> = self
            .storage
            .list(&location.bucket, &location.prefix)
            .await?
            .into_iter()
            .filter(|obj| obj.path.file_name() != self.merged_file_name)
            .collect();
        chunks.sort_by(|a, b| a.path.file_name().cmp(b.path.file_name()));

        if chunks.len() != expected {
            tracing::warn!(expected, found = chunks.len(), "Chunk count mismatch");
        }
        if chunks.is_empty() {
            return Err(PipelineError::NoChunks(format!(
                "{}/{}",
                location.bucket, location.prefix
            )));
        }
        warn_on_ordinal_disorder(chunks.iter().map(|c| c.path.file_name()));

        tokio::fs::create_dir_all(&self.temp_root).await?;
        let workspace = tempfile::Builder::new()
            .prefix("job-")
            .tempdir_in(&self.temp_root)?;
        let dir = workspace.path().to_path_buf();
        ctx.workspace = Some(workspace);

        let total = chunks.len();
        let mut total_bytes = 0u64;
        for (i, chunk) in chunks.iter().enumerate() {
            let dest = dir.join(chunk.path.file_name());
            let written = self
                .storage
                .download_to(&location.bucket, &chunk.path, &dest)
                .await?;
            total_bytes += written;
            ctx.chunk_paths.push(dest);

            if (i + 1) % 10 == 0 || i + 1 == total {
                tracing::debug!(downloaded = i + 1, total, total_bytes, "Chunk download progress");
            }
        }

        tracing::info!(chunks = total, total_bytes, "Chunks downloaded");
        Ok(StageFlow::Continue)
    }
}

/// Chunks are merged in lexical filename order. When the numeric ordinal in
/// the names disagrees (for example `chunk_10` before `chunk_2`) the merge
/// still proceeds but the mismatch is reported.
fn warn_on_ordinal_disorder<'a>(names: impl Iterator<Item = &'a str>) {
    let ordinals: Vec<(&str, u64)> = names
        .filter_map(|name| trailing_number(name).map(|n| (name, n)))
        .collect();

    if let Some(pair) = ordinals.windows(2).find(|w| w[0].1 > w[1].1) {
        tracing::warn!(
            before = pair[0].0,
            after = pair[1].0,
            "Lexical chunk order disagrees with numeric ordinals"
        );
    }
}

fn trailing_number(name: &str) -> Option<u64> {
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    let digits: String = stem
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits.parse().ok()
}

