//! The browse flow: fetch, print, count
//!
//! Output is written as it becomes available, so a failing count still leaves
//! the listing on screen.

use crate::formatter::{
    collection_total, empty_result, format_document, listing_header, summary_footer,
};
use crate::store::DocumentStore;
use fire_common::Result;
use std::io::Write;

/// What a successful browse printed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseOutcome {
    /// The fetch returned nothing; no count was requested
    Empty,
    Listed { shown: usize, total: u64 },
}

/// Fetch up to `limit` documents, print them to `out`, then print the
/// collection's aggregate count.
///
/// The count is only requested when the fetch returned at least one document.
#[tracing::instrument(skip(store, out))]
pub async fn browse<S, W>(
    store: &S,
    collection: &str,
    limit: u32,
    out: &mut W,
) -> Result<BrowseOutcome>
where
    S: DocumentStore + ?Sized,
    W: Write,
{
    let documents = store.fetch(collection, limit).await?;
    tracing::debug!("Fetched {} documents", documents.len());

    if documents.is_empty() {
        write_lines(out, &empty_result())?;
        return Ok(BrowseOutcome::Empty);
    }

    write_lines(out, &listing_header(documents.len()))?;
    for (i, doc) in documents.iter().enumerate() {
        write_lines(out, &format_document(doc, i + 1))?;
    }
    write_lines(out, &summary_footer(documents.len()))?;

    let total = store.count(collection).await?;
    write_lines(out, &collection_total(total))?;

    Ok(BrowseOutcome::Listed {
        shown: documents.len(),
        total,
    })
}

fn write_lines<W: Write>(out: &mut W, lines: &[String]) -> Result<()> {
    for line in lines {
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}
