//! Rendering DOT text through an external layout engine
//!
//! The default backend pipes DOT into the Graphviz `dot` program. Output
//! files are written through a temporary file in the destination directory
//! and moved into place only after the backend succeeded.

use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

use tracing::{debug, info, span, Level};

use super::error::{ErdError, Result};

/// Environment variable naming the Graphviz program to run
pub const DOT_PROGRAM_ENV: &str = "ERDWRIGHT_DOT";

/// Output format, chosen from the output file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputFormat {
    /// DOT source, written without running the backend
    Dot,
    Svg,
    Png,
    Pdf,
    Jpeg,
    Gif,
    Ps,
    Eps,
    Bmp,
    Webp,
}

impl OutputFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "dot" | "gv" => Some(OutputFormat::Dot),
            "svg" => Some(OutputFormat::Svg),
            "png" => Some(OutputFormat::Png),
            "pdf" => Some(OutputFormat::Pdf),
            "jpg" | "jpeg" => Some(OutputFormat::Jpeg),
            "gif" => Some(OutputFormat::Gif),
            "ps" => Some(OutputFormat::Ps),
            "eps" => Some(OutputFormat::Eps),
            "bmp" => Some(OutputFormat::Bmp),
            "webp" => Some(OutputFormat::Webp),
            _ => None,
        }
    }

    /// Infer the format from a path's extension
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            ErdError::render_error(format!(
                "cannot infer output format: '{}' has no file extension",
                path.display()
            ))
        })?;
        Self::from_extension(extension).ok_or_else(|| {
            ErdError::render_error(format!(
                "unsupported output format '.{}' (supported: {})",
                extension,
                Self::extensions().join(", ")
            ))
        })
    }

    /// Graphviz `-T` value
    pub fn graphviz_name(&self) -> &'static str {
        match self {
            OutputFormat::Dot => "dot",
            OutputFormat::Svg => "svg",
            OutputFormat::Png => "png",
            OutputFormat::Pdf => "pdf",
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Gif => "gif",
            OutputFormat::Ps => "ps",
            OutputFormat::Eps => "eps",
            OutputFormat::Bmp => "bmp",
            OutputFormat::Webp => "webp",
        }
    }

    /// Text formats can be printed to a terminal
    pub fn is_text(&self) -> bool {
        matches!(self, OutputFormat::Dot | OutputFormat::Svg)
    }

    /// Recognized file extensions
    pub fn extensions() -> &'static [&'static str] {
        &[
            "dot", "gv", "svg", "png", "pdf", "jpg", "jpeg", "gif", "ps", "eps", "bmp", "webp",
        ]
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_extension(s.trim_start_matches('.'))
            .ok_or_else(|| format!("Unknown output format: {}", s))
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.graphviz_name())
    }
}

/// Layout engine that turns DOT text into rendered bytes
pub trait RenderBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Render DOT source into `format`
    fn render(&self, dot: &str, format: OutputFormat) -> Result<Vec<u8>>;
}

/// Runs the Graphviz `dot` program
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphvizCli {
    program: PathBuf,
}

impl GraphvizCli {
    /// `dot` from `PATH`, unless `ERDWRIGHT_DOT` names another program
    pub fn new() -> Self {
        let program = std::env::var_os(DOT_PROGRAM_ENV)
            .filter(|p| !p.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("dot"));
        Self { program }
    }

    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for GraphvizCli {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for GraphvizCli {
    fn name(&self) -> &str {
        "graphviz"
    }

    fn render(&self, dot: &str, format: OutputFormat) -> Result<Vec<u8>> {
        let program = self.program.display().to_string();
        let render_span = span!(Level::DEBUG, "graphviz", program = %program, format = %format);
        let _enter = render_span.enter();

        let mut child = Command::new(&self.program)
            .arg(format!("-T{}", format.graphviz_name()))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ErdError::render_error_with_source(format!("failed to run '{}'", program), e)
            })?;

        // Feed stdin from another thread so a full stdout pipe cannot stall us
        let writer = child.stdin.take().map(|mut stdin| {
            let input = dot.to_string();
            std::thread::spawn(move || stdin.write_all(input.as_bytes()))
        });

        let output = child.wait_with_output().map_err(|e| {
            ErdError::render_error_with_source(format!("'{}' did not finish", program), e)
        })?;

        if let Some(writer) = writer {
            match writer.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) if !output.status.success() => {
                    debug!(error = %e, "Backend closed stdin early");
                }
                Ok(Err(e)) => {
                    return Err(ErdError::render_error_with_source(
                        format!("failed to send DOT to '{}'", program),
                        e,
                    ))
                }
                Err(_) => {
                    return Err(ErdError::render_error(format!(
                        "writer thread for '{}' panicked",
                        program
                    )))
                }
            }
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ErdError::render_error(format!(
                "'{}' exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }
        if output.stdout.is_empty() {
            return Err(ErdError::render_error(format!(
                "'{}' produced no {} output",
                program, format
            )));
        }

        debug!(bytes = output.stdout.len(), "Backend finished");
        Ok(output.stdout)
    }
}

/// Render DOT text to bytes; DOT output skips the backend
pub fn render_bytes(dot: &str, format: OutputFormat, backend: &dyn RenderBackend) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Dot => Ok(dot.as_bytes().to_vec()),
        _ => backend.render(dot, format),
    }
}

/// Render DOT text into `path`, format taken from the extension
pub fn render_to_path(dot: &str, path: &Path, backend: &dyn RenderBackend) -> Result<()> {
    let render_span = span!(
        Level::INFO,
        "render",
        path = %path.display(),
        backend = backend.name()
    );
    let _enter = render_span.enter();

    let format = OutputFormat::from_path(path)?;
    let bytes = render_bytes(dot, format, backend)?;
    write_atomic(path, &bytes)?;

    info!(format = %format, bytes = bytes.len(), "Rendered diagram");
    Ok(())
}

/// Write through a temporary file in the destination directory
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| {
        ErdError::render_error_with_source(
            format!("cannot create a temporary file in '{}'", dir.display()),
            e,
        )
    })?;
    temp.write_all(bytes)
        .and_then(|_| temp.flush())
        .map_err(|e| ErdError::render_error_with_source("failed to write rendered output", e))?;
    temp.persist(path).map_err(|e| {
        ErdError::render_error_with_source(format!("cannot write '{}'", path.display()), e.error)
    })?;
    Ok(())
}
