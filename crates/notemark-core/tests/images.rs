use std::path::Path;

use notemark_core::{Block, Inline, parse, path_to_file_url, resolve_local_images};

fn image_doc(url: &str) -> Vec<Block> {
    parse(
        &format!("---\nNotemark-Version: 1.0\n---\n#* Title\n![alt]({url})\n"),
        None,
    )
    .expect("parse")
    .blocks
}

fn first_url(blocks: &[Block]) -> &str {
    match &blocks[0] {
        Block::Paragraph { content, .. } => match &content[0] {
            Inline::Image { url, .. } => url,
            other => panic!("expected image, got {other:?}"),
        },
        other => panic!("expected paragraph, got {other:?}"),
    }
}

#[test]
fn local_references_resolve_against_the_base_dir() {
    let mut blocks = image_doc("local: notes/img 1.png");
    resolve_local_images(&mut blocks, Some(Path::new("/home/u/docs")));
    assert_eq!(first_url(&blocks), "file:///home/u/docs/notes/img%201.png");
}

#[test]
fn absolute_local_references_skip_the_base_dir() {
    let mut blocks = image_doc("local:/srv/img.png");
    resolve_local_images(&mut blocks, Some(Path::new("/home/u/docs")));
    assert_eq!(first_url(&blocks), "file:///srv/img.png");
}

#[test]
fn parent_segments_fold_lexically() {
    let mut blocks = image_doc("local:../shared/img.png");
    resolve_local_images(&mut blocks, Some(Path::new("/home/u/docs")));
    assert_eq!(first_url(&blocks), "file:///home/u/shared/img.png");
}

#[test]
fn without_a_base_dir_nothing_changes() {
    let mut blocks = image_doc("local: img.png");
    resolve_local_images(&mut blocks, None);
    assert_eq!(first_url(&blocks), "local: img.png");
}

#[test]
fn remote_urls_are_untouched() {
    let mut blocks = image_doc("https://example.com/img.png");
    resolve_local_images(&mut blocks, Some(Path::new("/home/u/docs")));
    assert_eq!(first_url(&blocks), "https://example.com/img.png");
}

#[test]
fn file_urls_percent_encode_reserved_bytes() {
    assert_eq!(
        path_to_file_url(Path::new("/a dir/föö.png")),
        "file:///a%20dir/f%C3%B6%C3%B6.png"
    );
}
