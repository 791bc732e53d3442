//! A hand-rolled canonical JSON text writer.
//!
//! Mirrors [`crate::encoder::Encoder`]: nothing here infers field order from
//! a Rust type. Every action and typed-data payload in [`crate::actions`]
//! calls these primitives directly, in the exact key order the wire
//! contract requires (`"type"` first, abbreviated field names where the
//! action pipeline calls for them). This is deliberate — a
//! `#[derive(Serialize)]` struct would need `#[serde(rename)]` on every
//! field and still leave key order to iteration order, which is exactly the
//! byte-exactness risk §4.7's "hand-written formatter" note calls out.
//!
//! Writes into an owned `String` rather than a caller buffer: JSON bodies
//! leave the process as HTTP request bodies, so unlike the encoder there is
//! no fixed-size hot-path buffer to reuse.

use core::fmt::Write as _;

enum Frame {
    Object { wrote_member: bool },
    /// An array frame also tracks whether the next value written is an
    /// element (needing comma handling) — always true for arrays.
    Array { wrote_element: bool },
}

/// Builds a JSON document by direct calls, not reflection.
pub struct JsonWriter {
    out: String,
    stack: Vec<Frame>,
}

impl JsonWriter {
    pub fn new() -> JsonWriter {
        JsonWriter {
            out: String::new(),
            stack: Vec::new(),
        }
    }

    /// Called immediately before writing any value (string/number/bool/null
    /// literal, or an object/array open brace) that sits directly as an
    /// array element. Object members go through `key` instead, which
    /// handles its own comma placement.
    fn before_array_element(&mut self) {
        if let Some(Frame::Array { wrote_element }) = self.stack.last_mut() {
            if *wrote_element {
                self.out.push(',');
            }
            *wrote_element = true;
        }
    }

    pub fn object_start(&mut self) {
        self.before_array_element();
        self.out.push('{');
        self.stack.push(Frame::Object { wrote_member: false });
    }

    pub fn object_end(&mut self) {
        self.stack.pop();
        self.out.push('}');
    }

    pub fn array_start(&mut self) {
        self.before_array_element();
        self.out.push('[');
        self.stack.push(Frame::Array { wrote_element: false });
    }

    pub fn array_end(&mut self) {
        self.stack.pop();
        self.out.push(']');
    }

    /// Writes an object member key. Must be immediately followed by exactly
    /// one value-writing call.
    pub fn key(&mut self, name: &str) {
        match self.stack.last_mut() {
            Some(Frame::Object { wrote_member }) => {
                if *wrote_member {
                    self.out.push(',');
                }
                *wrote_member = true;
            }
            _ => panic!("JsonWriter::key called outside an open object"),
        }
        write_json_string(&mut self.out, name);
        self.out.push(':');
    }

    pub fn str_value(&mut self, value: &str) {
        self.before_array_element();
        write_json_string(&mut self.out, value);
    }

    pub fn u64_value(&mut self, value: u64) {
        self.before_array_element();
        let _ = write!(self.out, "{value}");
    }

    pub fn i64_value(&mut self, value: i64) {
        self.before_array_element();
        let _ = write!(self.out, "{value}");
    }

    pub fn bool_value(&mut self, value: bool) {
        self.before_array_element();
        self.out.push_str(if value { "true" } else { "false" });
    }

    pub fn null_value(&mut self) {
        self.before_array_element();
        self.out.push_str("null");
    }

    /// Splices already-serialized JSON text in verbatim, for embedding a
    /// value produced by another hand-rolled writer (e.g. an `Action`'s own
    /// `to_json`) without re-parsing it.
    pub fn raw_value(&mut self, json: &str) {
        self.before_array_element();
        self.out.push_str(json);
    }

    pub fn finish(self) -> String {
        self.out
    }
}

impl Default for JsonWriter {
    fn default() -> Self {
        JsonWriter::new()
    }
}

fn write_json_string(out: &mut String, value: &str) {
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_with_scalar_fields() {
        let mut w = JsonWriter::new();
        w.object_start();
        w.key("type");
        w.str_value("noop");
        w.key("asset");
        w.u64_value(0);
        w.key("flag");
        w.bool_value(true);
        w.key("time");
        w.null_value();
        w.object_end();
        assert_eq!(w.finish(), r#"{"type":"noop","asset":0,"flag":true,"time":null}"#);
    }

    #[test]
    fn nested_array_of_objects() {
        let mut w = JsonWriter::new();
        w.object_start();
        w.key("cancels");
        w.array_start();
        w.object_start();
        w.key("a");
        w.u64_value(1);
        w.object_end();
        w.object_start();
        w.key("a");
        w.u64_value(2);
        w.object_end();
        w.array_end();
        w.object_end();
        assert_eq!(w.finish(), r#"{"cancels":[{"a":1},{"a":2}]}"#);
    }

    #[test]
    fn escapes_control_and_quote_characters() {
        let mut w = JsonWriter::new();
        w.object_start();
        w.key("code");
        w.str_value("a\"b\nc");
        w.object_end();
        assert_eq!(w.finish(), r#"{"code":"a\"b\nc"}"#);
    }

    #[test]
    fn empty_object_and_array() {
        let mut w = JsonWriter::new();
        w.object_start();
        w.key("orders");
        w.array_start();
        w.array_end();
        w.object_end();
        assert_eq!(w.finish(), r#"{"orders":[]}"#);
    }

    #[test]
    fn array_of_scalars_at_top_level() {
        let mut w = JsonWriter::new();
        w.array_start();
        w.u64_value(1);
        w.u64_value(2);
        w.u64_value(3);
        w.array_end();
        assert_eq!(w.finish(), "[1,2,3]");
    }
}
