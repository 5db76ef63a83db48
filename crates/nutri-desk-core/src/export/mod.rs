//! Export functionality for diet charts.
//!
//! The printable document is rendered to HTML here and handed to the host's
//! HTML-to-PDF renderer as an [`ExportJob`]. Saved plans can also be exported
//! as JSON or CSV.

mod document;
mod plan_export;

pub use document::*;
pub use plan_export::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Export errors.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: the diet chart is empty")]
    EmptyChart,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type ExportResult<T> = Result<T, ExportError>;

/// DOM id of the element the renderer captures.
pub const EXPORT_ANCHOR_ID: &str = "diet-chart-to-export";

/// Page and image settings for the PDF renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportOptions {
    /// Margin in `unit`s on every side
    pub margin: f64,
    /// JPEG quality for the rasterized page, 0..=1
    pub image_quality: f64,
    /// Rasterization scale factor
    pub scale: f64,
    pub unit: String,
    pub format: String,
    pub orientation: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            margin: 0.5,
            image_quality: 0.98,
            scale: 2.0,
            unit: "in".into(),
            format: "letter".into(),
            orientation: "portrait".into(),
        }
    }
}

/// `"{patient name with spaces as underscores}-DietChart.pdf"`
pub fn export_filename(patient_name: &str) -> String {
    format!("{}-DietChart.pdf", patient_name.trim().replace(' ', "_"))
}

/// Everything the host renderer needs to produce the PDF.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportJob {
    pub anchor_id: String,
    pub filename: String,
    pub html: String,
    pub options: ExportOptions,
}

impl ExportJob {
    /// Render `document` and package it with default options.
    pub fn for_document(document: &DietChartDocument) -> ExportResult<Self> {
        if document.chart.is_empty() {
            return Err(ExportError::EmptyChart);
        }

        Ok(Self {
            anchor_id: EXPORT_ANCHOR_ID.to_string(),
            filename: export_filename(&document.patient_name),
            html: document.render_html(),
            options: ExportOptions::default(),
        })
    }
}
