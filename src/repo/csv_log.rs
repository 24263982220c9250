use crate::consts;
use anyhow::{Context, anyhow};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::{fs::OpenOptions, io::AsyncWriteExt, sync::Mutex};

/// Audit log stored as a CSV file, header written once when the file is empty
pub struct CsvAuditLog {
    path: PathBuf,
    // serializes appends of this process so the header can't be written twice
    write_lock: Mutex<()>,
}

impl CsvAuditLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }
}

/// Encodes `record` as one CSV line, preceded by the header line if asked
fn encode_row(record: &super::AuditRecord, with_header: bool) -> anyhow::Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if with_header {
        writer.write_record(consts::AUDIT_LOG_HEADER)?;
    }
    writer.serialize(record)?;

    writer
        .into_inner()
        .map_err(|e| anyhow!("failed to encode audit row: {}", e.error()))
}

#[async_trait]
impl super::AuditRepo for CsvAuditLog {
    async fn append(&self, record: &super::AuditRecord) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("failed to open audit log {}", self.path.display()))?;

        let is_empty = file.metadata().await?.len() == 0;
        let row = encode_row(record, is_empty)?;

        file.write_all(&row)
            .await
            .with_context(|| format!("failed to append to audit log {}", self.path.display()))?;
        file.flush().await?;

        Ok(())
    }
}
