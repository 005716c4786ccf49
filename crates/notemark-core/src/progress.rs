/// The four fixed checkpoints of a parse/render run, in the order they fire.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Checkpoint {
    ParseStart,
    TreeBuilt,
    RenderStart,
    RenderDone,
}

impl Checkpoint {
    pub const ALL: [Checkpoint; 4] = [
        Checkpoint::ParseStart,
        Checkpoint::TreeBuilt,
        Checkpoint::RenderStart,
        Checkpoint::RenderDone,
    ];

    pub fn message(self) -> &'static str {
        match self {
            Checkpoint::ParseStart => "Parsing your file...",
            Checkpoint::TreeBuilt => "Document tree constructed.",
            Checkpoint::RenderStart => "Rendering HTML...",
            Checkpoint::RenderDone => "HTML rendering complete.",
        }
    }
}

/// Purely observational hook. Implementations must not influence parsing or
/// rendering; the core behaves identically under a no-op observer.
pub trait Progress {
    fn checkpoint(&mut self, checkpoint: Checkpoint);
}

/// Observer that ignores every checkpoint.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn checkpoint(&mut self, _checkpoint: Checkpoint) {}
}
