//! Augmented contract generation.
//!
//! The extracted contract text is re-emitted as a Word document, followed by
//! a page break and a compliance section holding the template of every
//! missing clause.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, instrument};

use clauseguard_compliance::rule_for;
use clauseguard_shared::{ArtifactRef, MissingRequirement, Result};
use clauseguard_storage::ArtifactStore;

use crate::docx::{self, Block};

/// File name prefix of generated documents.
pub const ARTIFACT_PREFIX: &str = "contract_modified";

/// File extension of generated documents.
pub const ARTIFACT_EXT: &str = "docx";

/// Render the main document part (`word/document.xml`) of the augmented
/// document. Pure: same inputs, same output.
pub fn render_augmented_document(
    full_text: &str,
    missing: &[MissingRequirement],
    generated_at: DateTime<Utc>,
) -> String {
    let stamp = format!(
        "Generated on {} UTC",
        generated_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    );
    let headings: Vec<String> = missing
        .iter()
        .map(|m| format!("{} ({})", m.requirement, m.regime))
        .collect();

    let mut blocks = vec![Block::Heading1("Original Contract (extracted)")];
    blocks.extend(
        full_text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(Block::Paragraph),
    );

    blocks.push(Block::PageBreak);
    blocks.push(Block::Heading1("Auto-added Compliance Clauses"));
    blocks.push(Block::Paragraph(&stamp));

    for (requirement, heading) in missing.iter().zip(&headings) {
        blocks.push(Block::Heading2(heading));
        let template = rule_for(requirement.regime).template;
        blocks.extend(
            template
                .lines()
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(Block::Paragraph),
        );
    }

    docx::document_xml(&blocks)
}

/// Render, package, and store the augmented document under a fresh unique name.
#[instrument(skip_all, fields(missing = missing.len()))]
pub fn build_augmented_document(
    store: &ArtifactStore,
    full_text: &str,
    missing: &[MissingRequirement],
) -> Result<ArtifactRef> {
    let document = render_augmented_document(full_text, missing, Utc::now());
    let bytes = docx::package(&document)?;
    let artifact = store.put_unique(ARTIFACT_PREFIX, ARTIFACT_EXT, &bytes)?;
    info!(name = %artifact.name, size = artifact.size_bytes, "augmented document written");
    Ok(artifact)
}
