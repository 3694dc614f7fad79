/// Infrastructure failure reported by a [`RecordStore`](crate::store::RecordStore).
///
/// Kept separate from validation outcomes so that "no duplicates found" can never be confused
/// with "could not check for duplicates".
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record store unavailable: {0}")]
    Unavailable(String),
    #[error("record store backend error: {0}")]
    Backend(String),
}

#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to read configuration file: {0}")]
    ConfigRead(std::io::Error),
    #[error("failed to parse configuration YAML: {0}")]
    ConfigYaml(serde_yaml::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("snapshot error: {0}")]
    Snapshot(#[from] intake_snapshot::SnapshotError),
}

pub type IntegrityResult<T> = std::result::Result<T, IntegrityError>;
