mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    DatabaseSettings, LlmProviderSettings, LlmSettings, LoggingSettings, PipelineSettings,
    ServerSettings, Settings, StorageProviderSetting, StorageSettings, TranscriptionSettings,
};
