use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use notemark_core::{Block, visit_image_urls};
use std::fs;
use std::path::PathBuf;

/// Replaces every `file://` image URL that points at a readable file with a
/// base64 data URL, guessing the media type from the extension. Unreadable
/// files and unknown types are left as they are; this pass never fails.
pub fn inline_file_images(blocks: &mut [Block]) {
    visit_image_urls(blocks, &mut |url| {
        let Some(path) = file_url_to_path(url) else {
            return;
        };
        if !path.is_file() {
            return;
        }
        let Some(mime) = mime_guess::from_path(&path).first_raw() else {
            return;
        };
        let Ok(data) = fs::read(&path) else {
            return;
        };
        let encoded = STANDARD.encode(data);
        *url = format!("data:{mime};base64,{encoded}");
    });
}

fn file_url_to_path(url: &str) -> Option<PathBuf> {
    let rest = url.strip_prefix("file://")?;
    Some(PathBuf::from(percent_decode(rest)))
}

fn percent_decode(text: &str) -> String {
    let bytes = text.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%'
            && i + 2 < bytes.len()
            && bytes[i + 1].is_ascii_hexdigit()
            && bytes[i + 2].is_ascii_hexdigit()
        {
            // Both bytes are ASCII, so the slice stays on char boundaries.
            if let Ok(byte) = u8::from_str_radix(&text[i + 1..i + 3], 16) {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::inline_file_images;
    use notemark_core::{Block, Inline, parse, path_to_file_url};
    use std::fs;

    // Smallest valid PNG header bytes; enough for a file-type test.
    const PNG_BYTES: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1A, b'\n'];

    fn image_url(blocks: &[Block]) -> String {
        match &blocks[0] {
            Block::Paragraph { content, .. } => match &content[0] {
                Inline::Image { url, .. } => url.clone(),
                other => panic!("expected image, got {other:?}"),
            },
            other => panic!("expected paragraph, got {other:?}"),
        }
    }

    #[test]
    fn existing_png_becomes_data_url() {
        let dir = tempfile::tempdir().expect("tempdir");
        let png = dir.path().join("pic.png");
        fs::write(&png, PNG_BYTES).expect("write png");

        let source = format!(
            "---\nNotemark-Version: 1.0\n---\n#* T\n![alt]({})\n",
            path_to_file_url(&png)
        );
        let mut doc = parse(&source, None).expect("parse");
        inline_file_images(&mut doc.blocks);

        let url = image_url(&doc.blocks);
        assert!(url.starts_with("data:image/png;base64,"), "got {url}");
    }

    #[test]
    fn missing_file_is_left_unchanged() {
        let source =
            "---\nNotemark-Version: 1.0\n---\n#* T\n![alt](file:///nowhere/missing.png)\n";
        let mut doc = parse(source, None).expect("parse");
        inline_file_images(&mut doc.blocks);
        assert_eq!(image_url(&doc.blocks), "file:///nowhere/missing.png");
    }

    #[test]
    fn malformed_percent_escapes_degrade_silently() {
        let source = "---\nNotemark-Version: 1.0\n---\n#* T\n![alt](file:///x%€y.png)\n";
        let mut doc = parse(source, None).expect("parse");
        inline_file_images(&mut doc.blocks);
        assert_eq!(image_url(&doc.blocks), "file:///x%€y.png");
    }

    #[test]
    fn non_file_urls_are_ignored() {
        let source = "---\nNotemark-Version: 1.0\n---\n#* T\n![alt](https://example.com/a.png)\n";
        let mut doc = parse(source, None).expect("parse");
        inline_file_images(&mut doc.blocks);
        assert_eq!(image_url(&doc.blocks), "https://example.com/a.png");
    }
}
