//! The low-level source emission API.
//!
//! Generation drives this writer to produce text; it never touches files or
//! packages itself. [`SourceWriter`] is an indentation-aware line builder
//! with block and guard helpers; [`FailureProvider`] is the pluggable seam
//! for how generated validation code reports a rejected value.

/// Indentation-aware Rust source builder.
#[derive(Debug, Default)]
pub struct SourceWriter {
    buf: String,
    indent: usize,
}

impl SourceWriter {
    pub fn new() -> Self {
        SourceWriter::default()
    }

    /// Append one line at the current indent level.
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if text.is_empty() {
            self.buf.push('\n');
            return self;
        }
        for _ in 0..self.indent {
            self.buf.push_str("    ");
        }
        self.buf.push_str(text);
        self.buf.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.buf.push('\n');
        self
    }

    /// Append a `///` doc comment, splitting on embedded newlines.
    pub fn doc(&mut self, text: impl AsRef<str>) -> &mut Self {
        for part in text.as_ref().lines() {
            if part.is_empty() {
                self.line("///");
            } else {
                self.line(format!("/// {part}"));
            }
        }
        self
    }

    /// Open a braced block: `header {`.
    pub fn open(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.line(format!("{} {{", header.as_ref()));
        self.indent += 1;
        self
    }

    /// Close the innermost block.
    pub fn close(&mut self) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self.line("}")
    }

    /// Close the innermost block with a trailing suffix, e.g. `});` bodies.
    pub fn close_with(&mut self, suffix: &str) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        self.line(format!("}}{suffix}"))
    }

    /// Emit `if condition { ... }` around the body closure.
    pub fn guard(&mut self, condition: impl AsRef<str>, body: impl FnOnce(&mut Self)) -> &mut Self {
        self.open(format!("if {}", condition.as_ref()));
        body(self);
        self.close()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn finish(self) -> String {
        self.buf
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }
}

/// Emits the target-language failure construct for a rejected value.
///
/// `message_expr` is a Rust expression of type `String` (typically a
/// `format!` call naming the member and the offending value).
pub trait FailureProvider {
    fn emit_failure(&self, w: &mut SourceWriter, message_expr: &str);

    /// The error type name constructors return, as written in generated
    /// signatures.
    fn error_type(&self) -> &str;
}

/// Default provider: early-return an `InvalidInput` error value.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResultFailure;

impl FailureProvider for ResultFailure {
    fn emit_failure(&self, w: &mut SourceWriter, message_expr: &str) {
        w.line(format!("return Err(InvalidInput::new({message_expr}));"));
    }

    fn error_type(&self) -> &str {
        "InvalidInput"
    }
}

/// Quote a string as a Rust string literal.
pub fn quote(s: &str) -> String {
    format!("{s:?}")
}

/// Quote a regex pattern as a raw literal where possible.
pub fn quote_raw(s: &str) -> String {
    if s.contains('"') || s.contains('\\') && s.contains('#') {
        format!("{s:?}")
    } else {
        format!("r\"{s}\"")
    }
}
