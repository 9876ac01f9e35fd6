//! Front-end configuration shared by the parser and the driver.

/// Flags that change how source is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    /// When set, bodies of `if`, `else`, `while`, `for` and `do` must be blocks.
    pub braces_required: bool,
}

impl Flags {
    pub fn braces_optional() -> Self {
        Flags {
            braces_required: false,
        }
    }
}

impl Default for Flags {
    fn default() -> Self {
        Flags {
            braces_required: true,
        }
    }
}
