//! Metric recording helpers, one namespace per pipeline stage.
//!
//! Thin wrappers over the `metrics` facade so call sites stay free of
//! metric-name strings. No exporter is installed by the binary; recording
//! through the facade is a no-op until one is.

/// Label enrichment workflows.
pub mod labels {
    pub fn batch_size(size: usize) {
        ::metrics::histogram!("labels_batch_size").record(size as f64);
    }

    pub fn unit_success() {
        ::metrics::counter!("labels_unit_success_total").increment(1);
    }

    pub fn unit_failure() {
        ::metrics::counter!("labels_unit_failure_total").increment(1);
    }
}

/// Top-100 chart scraping.
pub mod charts {
    pub fn fetch_success() {
        ::metrics::counter!("charts_fetch_success_total").increment(1);
    }

    pub fn fetch_error() {
        ::metrics::counter!("charts_fetch_error_total").increment(1);
    }

    pub fn entries_scraped(count: usize) {
        ::metrics::counter!("charts_entries_scraped_total").increment(count as u64);
    }
}

/// Spreadsheet reads and chunked writes.
pub mod sheets {
    pub fn rows_read(count: usize) {
        ::metrics::counter!("sheets_rows_read_total").increment(count as u64);
    }

    pub fn chunk_success() {
        ::metrics::counter!("sheets_chunk_success_total").increment(1);
    }

    pub fn chunk_retry() {
        ::metrics::counter!("sheets_chunk_retry_total").increment(1);
    }

    pub fn chunk_failure() {
        ::metrics::counter!("sheets_chunk_failure_total").increment(1);
    }

    pub fn cells_updated(count: usize) {
        ::metrics::counter!("sheets_cells_updated_total").increment(count as u64);
    }
}

/// Outbound HTTP to the scraped sites.
pub mod sources {
    pub fn request_success() {
        ::metrics::counter!("sources_requests_success_total").increment(1);
    }

    pub fn request_error() {
        ::metrics::counter!("sources_requests_error_total").increment(1);
    }
}
