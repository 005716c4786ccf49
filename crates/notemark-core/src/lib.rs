mod ast;
mod emit;
mod error;
mod images;
mod inline;
mod parser;
mod progress;

pub use ast::{Block, Document, Inline, InlineSeq, List, ListItem, Meta, Table};
pub use emit::{emit_blocks, escape_html, render_inlines};
pub use error::ParseError;
pub use images::{LOCAL_PREFIX, path_to_file_url, resolve_local_images, visit_image_urls};
pub use inline::parse_inline;
pub use parser::{NOTEMARK_VERSION, parse, parse_with_progress};
pub use progress::{Checkpoint, NoProgress, Progress};
