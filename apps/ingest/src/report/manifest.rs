//! `content_manifest.json`: an index of every artifact the run left behind.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::analyze::insights::ANALYZED_FILE;
use crate::errors::PipelineError;
use crate::extract::{METADATA_FILE, RAW_TEXT_FILE};
use crate::fs_ops;
use crate::render;
use crate::report::{stat_entry, FileEntry};
use crate::state::OutputLayout;

const DOWNLOADS: [&str; 6] = [
    render::TEXT_FILE,
    render::MARKDOWN_FILE,
    render::JSON_FILE,
    render::HTML_FILE,
    render::COVER_LETTER_FILE,
    render::COVER_LETTER_HTML_FILE,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestSource {
    pub pdf: Option<FileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestExtracted {
    pub raw_text: Option<FileEntry>,
    pub metadata: Option<FileEntry>,
    pub analysis: Option<FileEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub available: bool,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentManifest {
    pub timestamp: DateTime<Utc>,
    pub run_id: Uuid,
    pub source: ManifestSource,
    pub extracted: ManifestExtracted,
    pub downloads: BTreeMap<String, FileEntry>,
    pub preview: Availability,
    pub test_report: Availability,
}

fn availability(layout: &OutputLayout, path: &std::path::Path) -> Availability {
    Availability {
        available: path.is_file(),
        path: layout.public_url(path),
    }
}

pub async fn write_content_manifest(
    layout: &OutputLayout,
    pdf_path: &std::path::Path,
) -> Result<ContentManifest, PipelineError> {
    let mut downloads = BTreeMap::new();
    for name in DOWNLOADS {
        if let Some(entry) = stat_entry(layout, &layout.download(name)).await {
            downloads.insert(name.to_string(), entry);
        }
    }

    let manifest = ContentManifest {
        timestamp: Utc::now(),
        run_id: Uuid::new_v4(),
        source: ManifestSource {
            pdf: stat_entry(layout, pdf_path).await,
        },
        extracted: ManifestExtracted {
            raw_text: stat_entry(layout, &layout.extracted(RAW_TEXT_FILE)).await,
            metadata: stat_entry(layout, &layout.extracted(METADATA_FILE)).await,
            analysis: stat_entry(layout, &layout.extracted(ANALYZED_FILE)).await,
        },
        downloads,
        preview: availability(layout, &layout.preview_content()),
        test_report: availability(layout, &layout.test_report()),
    };

    let path = layout.content_manifest();
    fs_ops::write_json(&path, &manifest).await?;
    info!("Content manifest saved to {}", path.display());
    Ok(manifest)
}
