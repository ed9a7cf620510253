use anyhow::Context;
use clap::{Parser, Subcommand};
use docgate::{DocumentIntake, IntakeConfig};
use docgate_ocr::{FaceDetector, MockFaceDetector, TextRecognizer};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docgate")]
#[command(version, about = "Academic document intake: validate uploads and outline documents in frames")]
struct Cli {
    /// TOML configuration; built-in defaults when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// BlazeFace ONNX model; face rules are inactive without one.
    #[arg(long, global = true)]
    face_model: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Accept or reject an image for a category.
    Validate {
        #[arg(long)]
        category: String,
        file: PathBuf,
    },
    /// Print the document outline found in an image.
    Boundary { file: PathBuf },
    /// List the configured categories.
    Categories,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => IntakeConfig::load(path)?,
        None => IntakeConfig::default(),
    };

    let intake = DocumentIntake::new(config, recognizer(), face_detector(cli.face_model.as_deref())?)?;

    let output = match cli.command {
        Command::Validate { category, file } => {
            let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            let outcome = intake.validate(&bytes, &category).await?;
            json!({
                "file": file,
                "category": category,
                "accepted": outcome.is_accepted(),
                "code": outcome.reason().map(|r| r.code()),
                "message": outcome.message(),
            })
        }
        Command::Boundary { file } => {
            let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;
            json!({ "file": file, "boundary": intake.detect_boundary(&bytes) })
        }
        Command::Categories => {
            let categories: Vec<_> = intake
                .registry()
                .iter()
                .map(|c| json!({ "id": c.id, "label": c.label, "kind": c.kind }))
                .collect();
            json!(categories)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(feature = "tesseract")]
fn recognizer() -> Arc<dyn TextRecognizer> {
    let data_path = std::env::var("TESSDATA_PREFIX").ok();
    Arc::new(docgate_ocr::recognizer::tesseract_backend::TesseractRecognizer::new(data_path, "eng"))
}

#[cfg(not(feature = "tesseract"))]
fn recognizer() -> Arc<dyn TextRecognizer> {
    tracing::warn!("Built without the `tesseract` feature; every image will read as blank");
    Arc::new(docgate_ocr::MockRecognizer::new(""))
}

#[cfg(feature = "onnx")]
fn face_detector(model: Option<&Path>) -> anyhow::Result<Arc<dyn FaceDetector>> {
    match model {
        Some(path) => Ok(Arc::new(docgate_ocr::BlazeFaceDetector::load(path)?)),
        None => Ok(no_faces()),
    }
}

#[cfg(not(feature = "onnx"))]
fn face_detector(model: Option<&Path>) -> anyhow::Result<Arc<dyn FaceDetector>> {
    if model.is_some() {
        anyhow::bail!("--face-model needs a build with the `onnx` feature");
    }
    Ok(no_faces())
}

fn no_faces() -> Arc<dyn FaceDetector> {
    tracing::warn!("No face model given; selfie and group-photo rules will not fire");
    Arc::new(MockFaceDetector::with_faces(0))
}
