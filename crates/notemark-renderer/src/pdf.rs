//! PDF export through an external browser engine.
//!
//! The rendered page is written to a temporary file and printed with either
//! a headless Chromium or wkhtmltopdf, whichever is requested or found on
//! PATH. Math and diagrams are typeset by the page's own scripts, so the
//! engine is given time to execute them before printing.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use notemark_core::path_to_file_url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfBackend {
    Auto,
    Chromium,
    Wkhtmltopdf,
}

#[derive(Debug, Clone)]
pub struct PdfOptions {
    pub backend: PdfBackend,
    /// Page size keyword passed through to wkhtmltopdf (for example "A4").
    /// The chromium backend prints with its own defaults and ignores this.
    pub page_size: Option<String>,
}

impl PdfOptions {
    pub fn new(backend: PdfBackend) -> Self {
        Self {
            backend,
            page_size: None,
        }
    }

    pub fn with_page_size(mut self, page_size: impl Into<String>) -> Self {
        self.page_size = Some(page_size.into());
        self
    }
}

impl Default for PdfOptions {
    fn default() -> Self {
        Self::new(PdfBackend::Auto)
    }
}

#[derive(Debug, Clone)]
enum ResolvedBackend {
    Chromium(PathBuf),
    Wkhtmltopdf(PathBuf),
}

/// Prints a rendered HTML page to `output_path` as PDF. The page should have
/// its local images inlined beforehand, the browser runs without access to
/// the document's directory.
pub fn export_pdf(html: &str, output_path: &Path, options: &PdfOptions) -> Result<(), String> {
    let temp = TempFile::new("notemark_pdf", "html")
        .map_err(|err| format!("failed to create temp file: {}", err))?;
    fs::write(&temp.path, html).map_err(|err| format!("failed to write temp html: {}", err))?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| format!("failed to create output directory: {}", err))?;
        }
    }

    match resolve_backend(options.backend)? {
        ResolvedBackend::Chromium(path) => {
            export_with_chromium(&path, &temp.path, output_path, options)
        }
        ResolvedBackend::Wkhtmltopdf(path) => {
            export_with_wkhtmltopdf(&path, &temp.path, output_path, options)
        }
    }
}

fn resolve_backend(backend: PdfBackend) -> Result<ResolvedBackend, String> {
    let chromium = resolve_executable(&[
        "chromium",
        "chromium-browser",
        "google-chrome",
        "google-chrome-stable",
        "chrome",
        "msedge",
        "microsoft-edge",
    ]);
    let wkhtml = resolve_executable(&["wkhtmltopdf"]);

    match backend {
        PdfBackend::Chromium => chromium
            .map(ResolvedBackend::Chromium)
            .ok_or_else(|| "chromium backend not found in PATH".to_string()),
        PdfBackend::Wkhtmltopdf => wkhtml
            .map(ResolvedBackend::Wkhtmltopdf)
            .ok_or_else(|| "wkhtmltopdf backend not found in PATH".to_string()),
        PdfBackend::Auto => {
            if let Some(path) = chromium {
                Ok(ResolvedBackend::Chromium(path))
            } else if let Some(path) = wkhtml {
                Ok(ResolvedBackend::Wkhtmltopdf(path))
            } else {
                Err(
                    "no PDF backend found in PATH (chromium or wkhtmltopdf). Install one and retry."
                        .to_string(),
                )
            }
        }
    }
}

fn export_with_chromium(
    chromium: &Path,
    html_path: &Path,
    output_path: &Path,
    options: &PdfOptions,
) -> Result<(), String> {
    if options.page_size.is_some() {
        eprintln!("note: chromium backend ignores the page size option");
    }

    let mut cmd = Command::new(chromium);
    cmd.arg("--headless");
    cmd.arg("--disable-gpu");
    cmd.arg("--no-pdf-header-footer");
    // Lets the typesetting scripts finish before the print snapshot.
    cmd.arg("--virtual-time-budget=10000");
    cmd.arg(format!("--print-to-pdf={}", output_path.display()));
    cmd.arg(path_to_file_url(html_path));
    run_command(cmd, "chromium")
}

fn export_with_wkhtmltopdf(
    wkhtmltopdf: &Path,
    html_path: &Path,
    output_path: &Path,
    options: &PdfOptions,
) -> Result<(), String> {
    let mut cmd = Command::new(wkhtmltopdf);
    cmd.arg("--quiet");
    cmd.arg("--enable-local-file-access");
    cmd.arg("--javascript-delay").arg("2000");
    if let Some(page_size) = &options.page_size {
        cmd.arg("--page-size").arg(page_size);
    }
    cmd.arg(html_path);
    cmd.arg(output_path);
    run_command(cmd, "wkhtmltopdf")
}

fn run_command(mut cmd: Command, label: &str) -> Result<(), String> {
    let output = cmd
        .output()
        .map_err(|err| format!("failed to run {}: {}", label, err))?;
    if output.status.success() {
        return Ok(());
    }
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    let mut message = format!("{} failed", label);
    let stderr = stderr.trim();
    let stdout = stdout.trim();
    if !stderr.is_empty() {
        message.push_str(&format!(": {}", stderr));
    } else if !stdout.is_empty() {
        message.push_str(&format!(": {}", stdout));
    }
    Err(message)
}

fn resolve_executable(candidates: &[&str]) -> Option<PathBuf> {
    let path_var = env::var_os("PATH")?;
    for dir in env::split_paths(&path_var) {
        for candidate in candidates {
            let full = dir.join(candidate);
            if is_executable(&full) {
                return Some(full);
            }
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    let metadata = match fs::metadata(path) {
        Ok(value) => value,
        Err(_) => return false,
    };
    metadata.is_file() && metadata.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(prefix: &str, extension: &str) -> std::io::Result<Self> {
        let mut attempts = 0;
        let pid = std::process::id();
        loop {
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap_or_default();
            let filename = format!("{}_{}_{}.{}", prefix, pid, now.as_nanos(), extension);
            let path = env::temp_dir().join(filename);
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(_) => return Ok(Self { path }),
                Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                    attempts += 1;
                    if attempts > 10 {
                        return Err(err);
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}
