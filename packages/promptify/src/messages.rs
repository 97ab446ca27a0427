//! User-facing message text.

/// Stored on an item whose generation failed.
pub const ITEM_FAILED: &str = "Failed to generate prompt.";

pub const GENERATION_FAILED_TITLE: &str = "Prompt Generation Failed";

pub const BATCH_FAILED_TITLE: &str = "Batch Generation Incomplete";
pub const BATCH_FAILED_DESCRIPTION: &str =
    "Some prompts could not be generated. Check the affected images for details.";

pub const NO_URLS_TITLE: &str = "No URLs provided";
pub const NO_URLS_DESCRIPTION: &str = "Please enter at least one image URL.";

pub const DUPLICATE_URL_TITLE: &str = "Duplicate URL";

pub const NOTHING_TO_EXPORT_TITLE: &str = "Nothing to export";
pub const NOTHING_TO_EXPORT_DESCRIPTION: &str = "Generate at least one prompt before exporting.";

/// File name offered by prompt export.
pub const EXPORT_FILE_NAME: &str = "prompts.txt";

pub fn duplicate_url_description(url: &str) -> String {
    format!("{} is already in the list.", url)
}

pub fn duplicates_skipped_description(count: usize) -> String {
    if count == 1 {
        "1 URL was already in the list and was skipped.".to_string()
    } else {
        format!("{} URLs were already in the list and were skipped.", count)
    }
}
