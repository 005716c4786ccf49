use std::env;
use std::fs;
use std::path::Path;
use std::process;

use notemark_core::{Checkpoint, parse_with_progress};
use notemark_renderer::{
    PdfBackend, PdfOptions, RenderOptions, export_pdf, render_html_with_progress,
};

mod steps;

use steps::StepTracker;

const RED: &str = "\x1b[31m";
const RESET: &str = "\x1b[0m";

const STEP_PDF_RENDER: &str = "Rendering PDF...";
const STEP_PDF_DONE: &str = "PDF export complete.";

fn main() {
    let mut input: Option<String> = None;
    let mut html_out: Option<String> = None;
    let mut pdf_out: Option<String> = None;
    let mut css_path: Option<String> = None;
    let mut page_size: Option<String> = None;
    let mut backend = PdfBackend::Auto;
    let mut quiet = false;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_usage();
                return;
            }
            "--html" => html_out = Some(expect_value(&mut args, "--html")),
            "--pdf" => pdf_out = Some(expect_value(&mut args, "--pdf")),
            "--css" => css_path = Some(expect_value(&mut args, "--css")),
            "--page-size" => page_size = Some(expect_value(&mut args, "--page-size")),
            "--backend" => {
                backend = match expect_value(&mut args, "--backend").as_str() {
                    "auto" => PdfBackend::Auto,
                    "chromium" => PdfBackend::Chromium,
                    "wkhtmltopdf" => PdfBackend::Wkhtmltopdf,
                    other => {
                        eprintln!("unknown backend: {} (expected auto | chromium | wkhtmltopdf)", other);
                        process::exit(2);
                    }
                };
            }
            "--quiet" => quiet = true,
            _ => {
                if input.is_none() {
                    input = Some(arg);
                } else {
                    eprintln!("unexpected argument: {}", arg);
                    print_usage();
                    process::exit(2);
                }
            }
        }
    }

    let Some(input) = input else {
        print_usage();
        process::exit(2);
    };

    let source = fs::read_to_string(&input).unwrap_or_else(|err| {
        eprintln!("failed to read {}: {}", input, err);
        process::exit(1);
    });

    let stylesheet = css_path.map(|path| {
        fs::read_to_string(&path).unwrap_or_else(|err| {
            eprintln!("failed to read {}: {}", path, err);
            process::exit(1);
        })
    });

    let mut tracker = if quiet {
        StepTracker::silent()
    } else {
        let mut steps: Vec<String> = Checkpoint::ALL
            .iter()
            .map(|checkpoint| checkpoint.message().to_string())
            .collect();
        if pdf_out.is_some() {
            steps.push(STEP_PDF_RENDER.to_string());
            steps.push(STEP_PDF_DONE.to_string());
        }
        StepTracker::new(steps)
    };

    let mut document = match parse_with_progress(&source, Some(Path::new(&input)), &mut tracker) {
        Ok(document) => document,
        Err(err) => {
            eprintln!("{RED}Parse error: {err}{RESET}");
            process::exit(1);
        }
    };

    let options = RenderOptions {
        stylesheet,
        inline_local_images: pdf_out.is_some(),
    };
    let html = render_html_with_progress(&mut document, &options, &mut tracker);

    match html_out {
        Some(path) => {
            if let Err(err) = fs::write(&path, &html) {
                eprintln!("failed to write {}: {}", path, err);
                process::exit(1);
            }
            eprintln!("Wrote HTML: {}", path);
        }
        None => {
            if pdf_out.is_none() {
                print!("{}", html);
            }
        }
    }

    if let Some(path) = pdf_out {
        tracker.done(STEP_PDF_RENDER);
        let mut pdf_options = PdfOptions::new(backend);
        if let Some(page_size) = page_size {
            pdf_options = pdf_options.with_page_size(page_size);
        }
        if let Err(err) = export_pdf(&html, Path::new(&path), &pdf_options) {
            eprintln!("{RED}PDF export failed: {err}{RESET}");
            process::exit(1);
        }
        tracker.done(STEP_PDF_DONE);
        eprintln!("Wrote PDF: {}", path);
    }
}

fn expect_value(args: &mut impl Iterator<Item = String>, flag: &str) -> String {
    args.next().unwrap_or_else(|| {
        eprintln!("{} expects a value", flag);
        print_usage();
        process::exit(2);
    })
}

fn print_usage() {
    eprintln!(
        "Usage: notemark-cli [--html out] [--pdf out] [--css file] [--page-size A4] [--backend auto|chromium|wkhtmltopdf] [--quiet] input"
    );
}
