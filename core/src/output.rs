//! On-disk artifacts: CDR month files and UDR JSON documents.

use crate::{
    error::{CdrError, CdrResult},
    record::MonthlyBatch,
    report::UsageDocument,
    sink::UsageSink,
    types::Month,
    usage_aggregator::UsageRecord,
};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Create `dir` if missing, otherwise delete the files directly inside it.
/// Subdirectories are left alone.
pub fn prepare_directory(dir: &Path) -> CdrResult<()> {
    if !dir.exists() {
        fs::create_dir_all(dir).map_err(|e| CdrError::io(dir, e))?;
        log::debug!("created {}", dir.display());
        return Ok(());
    }

    let mut removed = 0usize;
    for entry in fs::read_dir(dir).map_err(|e| CdrError::io(dir, e))? {
        let path = entry.map_err(|e| CdrError::io(dir, e))?.path();
        if path.is_file() {
            fs::remove_file(&path).map_err(|e| CdrError::io(&path, e))?;
            removed += 1;
        }
    }
    log::debug!("cleared {removed} file(s) from {}", dir.display());
    Ok(())
}

/// Writes and reads `cdr_<month>.txt` files.
pub struct CdrFileWriter {
    dir: PathBuf,
}

impl CdrFileWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, month: Month) -> PathBuf {
        self.dir.join(format!("cdr_{month}.txt"))
    }

    /// Prepare the directory and write every batch, one file per month.
    pub fn write_all(&self, batches: &[MonthlyBatch]) -> CdrResult<Vec<PathBuf>> {
        prepare_directory(&self.dir)?;
        batches.iter().map(|b| self.write_batch(b)).collect()
    }

    pub fn write_batch(&self, batch: &MonthlyBatch) -> CdrResult<PathBuf> {
        let path = self.path_for(batch.month);
        fs::write(&path, batch.to_lines()).map_err(|e| CdrError::io(&path, e))?;
        log::debug!("month={:02} wrote {} calls to {}", batch.month, batch.len(), path.display());
        Ok(path)
    }

    pub fn read_batch(&self, month: Month) -> CdrResult<MonthlyBatch> {
        let path = self.path_for(month);
        let body = fs::read_to_string(&path).map_err(|e| CdrError::io(&path, e))?;
        MonthlyBatch::parse(month, &body)
    }
}

/// Usage sink writing one pretty-printed `<msisdn>_<month>.json` per record.
pub struct JsonReportWriter {
    dir:     PathBuf,
    written: Vec<PathBuf>,
}

impl JsonReportWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into(), written: Vec::new() }
    }

    pub fn path_for(&self, msisdn: &str, month: Month) -> PathBuf {
        self.dir.join(format!("{msisdn}_{month}.json"))
    }

    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl UsageSink for JsonReportWriter {
    fn prepare(&mut self) -> CdrResult<()> {
        self.written.clear();
        prepare_directory(&self.dir)
    }

    fn write_usage(&mut self, month: Month, usage: &UsageRecord) -> CdrResult<()> {
        let path = self.path_for(&usage.msisdn, month);
        let json = UsageDocument::from(usage).to_json_bytes()?;
        fs::write(&path, json).map_err(|e| CdrError::io(&path, e))?;
        self.written.push(path);
        Ok(())
    }
}
