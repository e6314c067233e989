use ahash::AHashSet;
use rand::Rng;

/// Source of synthetic node ids.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> String;
}

/// 16 lowercase hex characters, the same shape the editor uses for its own ids.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> String {
        format!("{:016x}", rand::rng().random::<u64>())
    }
}

/// Predictable ids (`<prefix>1`, `<prefix>2`, ...), handy for reproducible output.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    prefix: String,
    next: u64,
}

impl SequentialIds {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> String {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}

/// Draws ids until one is not in `taken`.
pub(crate) fn fresh_id(ids: &mut dyn IdGenerator, taken: &AHashSet<String>) -> String {
    loop {
        let id = ids.next_id();
        if !id.is_empty() && !taken.contains(&id) {
            return id;
        }
    }
}
