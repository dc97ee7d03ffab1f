//! Test doubles and fixtures shared by the `docbot` crates' integration
//! tests: mock AI providers that record their calls, and a PDF generator for
//! extraction tests.

use async_trait::async_trait;
use docbot::errors::PromptError;
use docbot::providers::ai::{AiProvider, Embedder};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

// --- Mock AI Provider ---

/// A chat provider that replays a programmed response and records every
/// prompt. With nothing programmed it fails, which is how tests exercise the
/// error path.
#[derive(Clone, Debug, Default)]
pub struct MockAiProvider {
    response: Arc<Mutex<Option<String>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Programs the response returned by every subsequent `generate` call.
    pub fn set_response(&self, response: &str) {
        *self.response.lock().unwrap() = Some(response.to_string());
    }

    /// Retrieves the recorded prompts for assertion.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, PromptError> {
        self.calls.lock().unwrap().push(prompt.to_string());
        match self.response.lock().unwrap().clone() {
            Some(response) => Ok(response),
            None => Err(PromptError::AiApi(
                "MockAiProvider: no response programmed".to_string(),
            )),
        }
    }
}

// --- Mock Embedder ---

/// A deterministic, in-process embedder: specific vectors can be programmed
/// per input, and everything else falls back to a stable function of the
/// text's bytes so identical texts always embed identically.
#[derive(Clone, Debug)]
pub struct MockEmbedder {
    model: String,
    vectors: Arc<Mutex<HashMap<String, Vec<f32>>>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self::with_model("mock-embedder")
    }

    pub fn with_model(model: &str) -> Self {
        Self {
            model: model.to_string(),
            vectors: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pins the vector returned for one exact input text.
    pub fn add_vector(&self, text: &str, vector: Vec<f32>) {
        self.vectors
            .lock()
            .unwrap()
            .insert(text.to_string(), vector);
    }

    /// Retrieves the recorded embedding inputs for assertion.
    pub fn get_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn fallback_vector(text: &str) -> Vec<f32> {
        let bytes = text.as_bytes();
        let sum: u32 = bytes.iter().map(|b| u32::from(*b)).sum();
        let first = f32::from(*bytes.first().unwrap_or(&1));
        let last = f32::from(*bytes.last().unwrap_or(&1));
        vec![(sum % 101) as f32 + 1.0, bytes.len() as f32 + 1.0, first, last]
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    fn model_id(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, PromptError> {
        self.calls.lock().unwrap().push(text.to_string());
        let programmed = self.vectors.lock().unwrap().get(text).cloned();
        Ok(programmed.unwrap_or_else(|| Self::fallback_vector(text)))
    }
}

// --- Test-Specific Helpers ---
#[cfg(feature = "pdf")]
pub mod helpers {
    use anyhow::Result;
    use printpdf::{
        BuiltinFont, Layer, Mm, Op, ParsedFont, PdfDocument, PdfPage, PdfSaveOptions, Pt, TextItem,
        TextMatrix, TextRenderingMode,
    };

    /// Generates a simple, single-page PDF with the given text content,
    /// compatible with printpdf v0.8.2.
    pub fn generate_test_pdf(text: &str) -> Result<Vec<u8>> {
        let mut doc = PdfDocument::new("Test PDF");
        let mut page = PdfPage::new(Mm(210.0), Mm(297.0), vec![]);
        let layer_def = Layer::new("Layer 1");
        let layer_id = doc.add_layer(&layer_def);

        // Get the font bytes for a built-in font and parse it.
        let font_bytes = BuiltinFont::Helvetica.get_subset_font().bytes;
        let font = ParsedFont::from_bytes(&font_bytes, 0, &mut Vec::new())
            .ok_or_else(|| anyhow::anyhow!("Failed to parse built-in font"))?;
        let font_id = doc.add_font(&font);

        let ops = vec![
            Op::BeginLayer {
                layer_id: layer_id.clone(),
            },
            Op::SetFontSize {
                size: Pt(12.0),
                font: font_id.clone(),
            },
            Op::StartTextSection,
            Op::SetTextMatrix {
                matrix: TextMatrix::Translate(Mm(10.0).into(), Mm(280.0).into()),
            },
            Op::SetTextRenderingMode {
                mode: TextRenderingMode::Fill,
            },
            Op::WriteText {
                items: vec![TextItem::Text(text.to_string())],
                font: font_id,
            },
            Op::EndTextSection,
            Op::EndLayer { layer_id },
        ];

        page.ops = ops;
        doc.pages.push(page);

        let mut warnings = Vec::new();
        let bytes = doc.save(&PdfSaveOptions::default(), &mut warnings);
        if !warnings.is_empty() {
            eprintln!("PDF generation warnings: {warnings:?}");
        }

        Ok(bytes)
    }
}
