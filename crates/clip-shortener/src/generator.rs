use rand::Rng;

/// Trait for generating short identifiers.
///
/// Implementations are pure generators that don't interact with storage;
/// uniqueness-on-write is the store's job.
pub trait IdGenerator: Send + Sync + 'static {
    /// Generates a short, printable identifier.
    fn generate(&self) -> String;
}

/// Generates 8 lowercase hex characters from 4 random bytes.
///
/// Entropy exhaustion panics inside `rand` on first use; that is a
/// process-startup-class failure, not a per-request one.
#[derive(Debug, Clone, Copy, Default)]
pub struct HexIdGenerator;

impl HexIdGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for HexIdGenerator {
    fn generate(&self) -> String {
        let bytes: [u8; 4] = rand::thread_rng().gen();
        format!("{:08x}", u32::from_be_bytes(bytes))
    }
}
