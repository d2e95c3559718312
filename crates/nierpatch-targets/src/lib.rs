//! Known NieR: Automata executables and their patch signatures.
//!
//! The offline patch flips the online-check routine so that it always
//! reports success. Each supported build of the game keeps that routine
//! at a fixed file offset; the bytes at the offset are the same in both
//! builds.
//!
//! ```text
//! original:  33 C0 83   xor eax, eax ; cmp ...
//! patched:   B0 01 C3   mov al, 1    ; ret
//! ```

#![deny(missing_docs)]

use serde::Serialize;

/// Bytes found at the patch offset in an unmodified executable.
pub const ORIGINAL_BYTES: [u8; 3] = [0x33, 0xC0, 0x83];

/// Bytes written at the patch offset.
pub const PATCHED_BYTES: [u8; 3] = [0xB0, 0x01, 0xC3];

/// A supported executable and where its signature lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct KnownExecutable {
    /// File name as shipped by the game (e.g. `NieRAutomata.exe`).
    pub file_name: &'static str,
    /// Human-readable build description.
    pub description: &'static str,
    /// Byte offset of the signature within the file.
    pub offset: u64,
    /// Signature of an unpatched file.
    pub original: &'static [u8],
    /// Signature of a patched file.
    pub patched: &'static [u8],
}

/// Every executable the tool knows how to patch.
pub const KNOWN_EXECUTABLES: &[KnownExecutable] = &[
    KnownExecutable {
        file_name: "NieRAutomata.exe",
        description: "DirectX 12 version",
        offset: 0x8B_6000,
        original: &ORIGINAL_BYTES,
        patched: &PATCHED_BYTES,
    },
    KnownExecutable {
        file_name: "NieRAutomataCompat.exe",
        description: "DirectX 11 compatibility version",
        offset: 0x8A_D800,
        original: &ORIGINAL_BYTES,
        patched: &PATCHED_BYTES,
    },
];

/// Look up a known executable by exact file name.
pub fn lookup(file_name: &str) -> Option<&'static KnownExecutable> {
    KNOWN_EXECUTABLES.iter().find(|k| k.file_name == file_name)
}

/// File names of all known executables, in table order.
pub fn file_names() -> impl Iterator<Item = &'static str> {
    KNOWN_EXECUTABLES.iter().map(|k| k.file_name)
}
