use std::path::Path;

use notemark_core::parse;

fn doc(body: &str) -> String {
    format!("---\nNotemark-Version: 1.0\n---\n#* Title\n{body}")
}

#[test]
fn full_header_parses() {
    let source = "---\nNotemark-Version: 1.0\nauthor: Ada Lovelace\ndate: 1.1.2026\ntags: math, notes\n---\n#* Analytical Notes\nBody.\n";
    let document = parse(source, None).expect("parse");
    assert_eq!(document.title, "Analytical Notes");
    assert_eq!(document.meta.author.as_deref(), Some("Ada Lovelace"));
    assert_eq!(document.meta.date.as_deref(), Some("1.1.2026"));
    assert_eq!(
        document.meta.tags,
        Some(vec!["math".to_string(), "notes".to_string()])
    );
}

#[test]
fn missing_header_is_rejected() {
    let err = parse("#* Title\n", None).unwrap_err();
    assert_eq!(err.line(), Some(1));
    assert_eq!(err.message(), "Missing front-matter header");
}

#[test]
fn header_line_without_colon_is_rejected() {
    let err = parse("---\nnot a header\n---\n#* Title\n", None).unwrap_err();
    assert_eq!(err.line(), Some(2));
    assert_eq!(err.message(), "Invalid header line: not a header");
}

#[test]
fn wrong_version_is_rejected() {
    let err = parse("---\nNotemark-Version: 2.0\n---\n#* Title\n", None).unwrap_err();
    assert_eq!(err.message(), "Unsupported Notemark version");
    assert_eq!(err.line(), None);
}

#[test]
fn missing_version_is_rejected() {
    let err = parse("---\nauthor: Ada\n---\n#* Title\n", None).unwrap_err();
    assert_eq!(err.message(), "Unsupported Notemark version");
}

#[test]
fn empty_author_is_rejected() {
    let err = parse("---\nNotemark-Version: 1.0\nauthor:\n---\n#* Title\n", None).unwrap_err();
    assert_eq!(err.message(), "Header author cannot be empty");
}

#[test]
fn date_must_be_dotted() {
    let err = parse(
        "---\nNotemark-Version: 1.0\ndate: 2026-01-01\n---\n#* Title\n",
        None,
    )
    .unwrap_err();
    assert_eq!(
        err.message(),
        "Header date must use D.M.YYYY format (e.g. 1.1.2026)"
    );

    let ok = parse(
        "---\nNotemark-Version: 1.0\ndate: 31.12.2026\n---\n#* Title\n",
        None,
    );
    assert!(ok.is_ok());
}

#[test]
fn tags_with_only_separators_are_rejected() {
    let err = parse(
        "---\nNotemark-Version: 1.0\ntags: , ,\n---\n#* Title\n",
        None,
    )
    .unwrap_err();
    assert_eq!(err.message(), "Header tags cannot be empty");
}

#[test]
fn missing_title_line_is_rejected() {
    let err = parse("---\nNotemark-Version: 1.0\n---\n", None).unwrap_err();
    assert_eq!(err.message(), "Missing document title");
    assert_eq!(err.line(), Some(4));
}

#[test]
fn title_must_follow_the_header() {
    let err = parse("---\nNotemark-Version: 1.0\n---\nHello\n", None).unwrap_err();
    assert_eq!(
        err.message(),
        "Document title must be the first line after the header"
    );
    assert_eq!(err.line(), Some(4));
}

#[test]
fn blank_title_is_rejected() {
    let err = parse("---\nNotemark-Version: 1.0\n---\n#*   \n", None).unwrap_err();
    assert_eq!(err.message(), "Missing document title");
    assert_eq!(err.line(), Some(4));
}

#[test]
fn crlf_sources_parse() {
    let source = "---\r\nNotemark-Version: 1.0\r\n---\r\n#* Title\r\nBody.\r\n";
    let document = parse(source, None).expect("parse");
    assert_eq!(document.title, "Title");
    assert_eq!(document.blocks.len(), 1);
}

#[test]
fn base_dir_comes_from_the_source_path() {
    let document = parse(&doc("Body.\n"), Some(Path::new("/tmp/notes/doc.nmd"))).expect("parse");
    assert_eq!(
        document.meta.base_dir.as_deref(),
        Some(Path::new("/tmp/notes"))
    );

    let without = parse(&doc("Body.\n"), None).expect("parse");
    assert_eq!(without.meta.base_dir, None);
}

#[test]
fn later_header_keys_override_earlier_ones() {
    let source = "---\nNotemark-Version: 1.0\nauthor: First\nauthor: Second\n---\n#* Title\n";
    let document = parse(source, None).expect("parse");
    assert_eq!(document.meta.author.as_deref(), Some("Second"));
}
