//! Per-access descriptor.
//!
//! One `AccessInfo` is produced by the surrounding cache for every demand
//! access. It carries the byte address, the program counter of the
//! instruction that issued it (when known) and the security tag used by the
//! tagged tables.

use super::addr::block_address;

/// A single memory access as seen by the prediction engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct AccessInfo {
    /// Byte address of the access.
    pub addr: u64,
    /// Program counter of the issuing instruction, if known.
    pub pc: Option<u64>,
    /// Secure-world tag; tagged tables keep secure and non-secure entries apart.
    pub secure: bool,
}

impl AccessInfo {
    /// Creates a non-secure access without a program counter.
    pub const fn new(addr: u64) -> Self {
        Self {
            addr,
            pc: None,
            secure: false,
        }
    }

    /// Creates a non-secure access issued by the instruction at `pc`.
    pub const fn with_pc(addr: u64, pc: u64) -> Self {
        Self {
            addr,
            pc: Some(pc),
            secure: false,
        }
    }

    /// Returns a copy of this access carrying the given security tag.
    #[must_use]
    pub const fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    /// Returns `true` if the access carries a program counter.
    #[inline]
    pub const fn has_pc(&self) -> bool {
        self.pc.is_some()
    }

    /// Block-aligned address of this access.
    #[inline]
    pub const fn block_address(&self, line_bytes: u64) -> u64 {
        block_address(self.addr, line_bytes)
    }
}
