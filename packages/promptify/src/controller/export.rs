//! Prompt export.

use std::path::{Path, PathBuf};

use tracing::info;

use super::PromptController;
use crate::error::{PromptifyError, Result};
use crate::messages;
use crate::traits::alerter::Alert;

/// A downloadable text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFile {
    pub file_name: String,
    pub contents: String,
}

impl ExportFile {
    /// Write the file into `dir`, returning its path.
    pub fn write_to(&self, dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = dir.as_ref().join(&self.file_name);
        std::fs::write(&path, &self.contents)?;
        Ok(path)
    }
}

impl PromptController {
    /// All prompts in display order, newline-separated, as `prompts.txt`.
    ///
    /// Items without a prompt are skipped. When no item has one, raises an
    /// informational alert and fails with `NothingToExport`.
    pub fn export_prompts(&self) -> Result<ExportFile> {
        let prompts: Vec<String> = self.store_read().prompts().map(str::to_string).collect();

        if prompts.is_empty() {
            self.alerter.notify(Alert::info(
                messages::NOTHING_TO_EXPORT_TITLE,
                messages::NOTHING_TO_EXPORT_DESCRIPTION,
            ));
            return Err(PromptifyError::NothingToExport);
        }

        info!(count = prompts.len(), "Exporting prompts");
        Ok(ExportFile {
            file_name: messages::EXPORT_FILE_NAME.to_string(),
            contents: prompts.join("\n"),
        })
    }
}
