use scribe_pipeline::domain::{
    AiProvider, JobStatus, PipelineStage, SessionId, SessionRecord, StorageLocation, StoragePath,
    WAV_HEADER_LEN, WavHeader, WavHeaderError,
};

mod helpers;

#[test]
fn given_active_status_when_moving_forward_then_transition_is_allowed() {
    assert!(JobStatus::Pending.can_transition_to(JobStatus::Downloading));
    assert!(JobStatus::Downloading.can_transition_to(JobStatus::Concatenating));
    assert!(JobStatus::Transcribing.can_transition_to(JobStatus::GeneratingDocs));
    assert!(JobStatus::GeneratingDocs.can_transition_to(JobStatus::Completed));
}

#[test]
fn given_active_status_when_moving_backward_then_transition_is_rejected() {
    assert!(!JobStatus::Concatenating.can_transition_to(JobStatus::Downloading));
    assert!(!JobStatus::GeneratingDocs.can_transition_to(JobStatus::Transcribing));
    assert!(!JobStatus::Downloading.can_transition_to(JobStatus::Pending));
    assert!(!JobStatus::Transcribing.can_transition_to(JobStatus::Transcribing));
}

#[test]
fn given_any_active_status_when_failing_then_transition_is_allowed() {
    for status in JobStatus::ACTIVE {
        assert!(status.can_transition_to(JobStatus::Failed), "{status}");
    }
}

#[test]
fn given_terminal_status_when_transitioning_then_every_target_is_rejected() {
    for from in [JobStatus::Completed, JobStatus::Failed] {
        for to in JobStatus::ALL {
            assert!(!from.can_transition_to(to), "{from} -> {to}");
        }
    }
}

#[test]
fn given_transcribing_when_listing_predecessors_then_only_earlier_active_statuses_appear() {
    let preds = JobStatus::Transcribing.predecessors();
    assert_eq!(
        preds,
        vec![
            JobStatus::Pending,
            JobStatus::Downloading,
            JobStatus::Concatenating
        ]
    );
}

#[test]
fn given_unknown_status_string_when_parsing_then_error_names_it() {
    let err = "paused".parse::<JobStatus>().unwrap_err();
    assert_eq!(err, "Invalid job status: paused");
    assert_eq!(
        "generating_docs".parse::<JobStatus>().unwrap(),
        JobStatus::GeneratingDocs
    );
}

#[test]
fn given_entry_stage_when_sequencing_then_earlier_stages_are_skipped() {
    let stages: Vec<_> = PipelineStage::sequence_from(PipelineStage::Transcribing).collect();
    assert_eq!(
        stages,
        vec![PipelineStage::Transcribing, PipelineStage::GeneratingDocs]
    );
    assert_eq!(PipelineStage::sequence_from(PipelineStage::Downloading).count(), 5);
}

#[test]
fn given_upload_stage_when_mapping_to_job_status_then_none_is_returned() {
    assert_eq!(PipelineStage::Uploading.job_status(), None);
    assert_eq!(
        PipelineStage::Concatenating.job_status(),
        Some(JobStatus::Concatenating)
    );
}

#[test]
fn given_snake_case_stage_name_when_deserializing_then_stage_is_parsed() {
    let stage: PipelineStage = serde_json::from_str("\"generating_docs\"").unwrap();
    assert_eq!(stage, PipelineStage::GeneratingDocs);
    assert!(serde_json::from_str::<PipelineStage>("\"mixing\"").is_err());
}

#[test]
fn given_provider_names_when_parsing_then_supported_set_is_closed() {
    for provider in AiProvider::ALL {
        assert_eq!(provider.as_str().parse::<AiProvider>().unwrap(), provider);
    }
    assert_eq!(
        "mistral".parse::<AiProvider>().unwrap_err(),
        "Invalid provider: mistral"
    );
}

#[test]
fn given_prefix_with_trailing_slash_when_building_object_path_then_single_separator_is_used() {
    let location = StorageLocation::new("recordings", "sessions/abc/");
    let path = location.object("chunk_001.wav");
    assert_eq!(path.as_str(), "sessions/abc/chunk_001.wav");
    assert_eq!(path.file_name(), "chunk_001.wav");
}

#[test]
fn given_bare_key_when_reading_file_name_then_whole_key_is_returned() {
    assert_eq!(StoragePath::from_raw("full.wav").file_name(), "full.wav");
}

#[test]
fn given_new_session_when_created_then_it_is_synced_without_checkpoints() {
    let mut session = SessionRecord::new(
        SessionId::new("s-1"),
        StorageLocation::new("recordings", "sessions/s-1"),
        3,
    );
    assert_eq!(session.status.as_str(), "synced");
    assert!(session.merged_audio_path.is_none());
    assert!(!session.has_transcript());

    session.raw_transcript = Some(String::new());
    assert!(!session.has_transcript());
}

#[test]
fn given_canonical_wav_when_parsing_header_then_format_fields_are_read() {
    let bytes = helpers::wav_bytes(1000, 7);
    let header = WavHeader::parse(&bytes).unwrap();

    assert_eq!(header.channels, 1);
    assert_eq!(header.sample_rate, 16_000);
    assert_eq!(header.bits_per_sample, 16);
    assert_eq!(header.block_align, 2);
    assert_eq!(header.data_len, 1000);
    assert!(header.has_data_tag);
}

#[test]
fn given_malformed_headers_when_parsing_then_specific_errors_are_returned() {
    assert_eq!(
        WavHeader::parse(&[0u8; 10]).unwrap_err(),
        WavHeaderError::TooShort(10)
    );

    let mut no_riff = helpers::wav_bytes(8, 0);
    no_riff[0..4].copy_from_slice(b"RIFX");
    assert!(matches!(
        WavHeader::parse(&no_riff).unwrap_err(),
        WavHeaderError::Malformed(_)
    ));

    let mut no_wave = helpers::wav_bytes(8, 0);
    no_wave[8..12].copy_from_slice(b"AVI ");
    assert!(matches!(
        WavHeader::parse(&no_wave).unwrap_err(),
        WavHeaderError::Malformed(_)
    ));
}

#[test]
fn given_list_chunk_before_data_when_parsing_header_then_format_is_read_and_offset_flagged() {
    let canonical = helpers::wav_bytes(400, 3);
    let list_body = b"INFOISFT\x04\x00\x00\x00test";
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&canonical[0..36]);
    bytes.extend_from_slice(b"LIST");
    bytes.extend_from_slice(&(list_body.len() as u32).to_le_bytes());
    bytes.extend_from_slice(list_body);
    bytes.extend_from_slice(&canonical[36..]);
    let riff_len = (bytes.len() - 8) as u32;
    bytes[4..8].copy_from_slice(&riff_len.to_le_bytes());

    let header = WavHeader::parse(&bytes).unwrap();

    assert!(!header.has_data_tag);
    assert_eq!(header.sample_rate, 16_000);
    assert_eq!(header.data_len, 400);
}

#[test]
fn given_header_when_rewriting_payload_len_then_riff_and_data_sizes_follow() {
    let header = WavHeader::parse(&helpers::wav_bytes(10, 0)).unwrap();
    let rewritten = header.with_payload_len(3000);

    assert_eq!(rewritten.len(), WAV_HEADER_LEN);
    assert_eq!(helpers::u32_at(&rewritten, 4), 3036);
    assert_eq!(helpers::u32_at(&rewritten, 40), 3000);
    assert_eq!(&rewritten[0..4], b"RIFF");
    assert_eq!(&rewritten[36..40], b"data");
}
