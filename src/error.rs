//! The interpreter's error taxonomy. Unlike the donor C, which stashes an
//! `h8_error` code plus a raw `__LINE__` onto the system struct, errors here
//! are typed and carry their call site via `#[track_caller]`.

use std::fmt;

/// A frozen-execution error. Once `System::error` holds one of these,
/// further `step` calls are no-ops until the caller resets the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EmulatorError {
    /// The decoder found a 256-entry table slot with no handler, or a
    /// handler hit a subcase that is explicitly not implemented yet
    /// (MOVFPE, certain STC/LDC forms).
    #[error("unimplemented opcode at {location}")]
    UnimplementedOpcode { location: SourceLocation },

    /// An instruction's extension bits violate the ISA's prefix grammar.
    #[error("malformed opcode at {location}")]
    MalformedOpcode { location: SourceLocation },

    /// An SSU transfer was attempted with no device currently selected.
    #[error("SSU access with no selected device at {location}")]
    BadSsuAccess { location: SourceLocation },

    /// The program counter left legal bounds: above 0xFFFF, odd, or
    /// pointing into a region execution cannot legally reach.
    #[error("bad program counter at {location}")]
    BadPc { location: SourceLocation },

    /// An exhaustive match hit a branch that should be impossible.
    #[error("unreachable code at {location}")]
    UnreachableCode { location: SourceLocation },
}

/// A lightweight stand-in for the donor's `error_line`: the file/line of
/// the Rust call site that raised the error, captured via `Location`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

impl SourceLocation {
    #[track_caller]
    pub fn here() -> Self {
        let loc = std::panic::Location::caller();
        SourceLocation { file: loc.file(), line: loc.line() }
    }
}

impl EmulatorError {
    #[track_caller]
    pub fn unimplemented_opcode() -> Self {
        Self::UnimplementedOpcode { location: SourceLocation::here() }
    }
    #[track_caller]
    pub fn malformed_opcode() -> Self {
        Self::MalformedOpcode { location: SourceLocation::here() }
    }
    #[track_caller]
    pub fn bad_ssu_access() -> Self {
        Self::BadSsuAccess { location: SourceLocation::here() }
    }
    #[track_caller]
    pub fn bad_pc() -> Self {
        Self::BadPc { location: SourceLocation::here() }
    }
    #[track_caller]
    pub fn unreachable_code() -> Self {
        Self::UnreachableCode { location: SourceLocation::here() }
    }
}
