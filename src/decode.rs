//! Binary profile decoder.
//!
//! Wire format (all integers little-endian, one buffer = one tree):
//!
//!   OpNode := OpRef u32:invocation_count u32:raw_duration_us u16:child_count OpNode*child_count
//!   OpRef  := u16:tagged_handle [ Text:name Text:schema ]   (trailing fields only when low bit == 0)
//!   Text   := u16:length Bytes[length]                      (length 0 => absent)
//!
//! The low bit of a tagged handle selects definition (0) vs reference (1);
//! the remaining 15 bits are the handle. Definitions are interned into a
//! table owned by this reader, so the table lives exactly as long as one
//! decode session. Raw durations are microseconds on disk and are scaled
//! to nanoseconds here.

use crate::model::{Op, OpNode};
use std::collections::HashMap;
use std::rc::Rc;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("unexpected end of data at offset {0}")]
    UnexpectedEndOfData(usize),

    #[error("op definition at offset {0} has no name")]
    NullOpName(usize),

    #[error("Op with handle '{0}' not in table")]
    UnknownHandle(u16),

    #[error("invalid utf-8 in text field at offset {0}")]
    InvalidUtf8(usize),
}

/// Decode one profile buffer into its root node.
///
/// A fresh reader (and thus a fresh intern table) is used per call; handles
/// are scoped to a single decode session.
pub fn decode_profile(buf: &[u8]) -> Result<Rc<OpNode>, DecodeError> {
    OpNodeReader::new(buf).read_op_node()
}

/// Single forward pass over a fully-buffered byte slice. The cursor only
/// ever moves forward; there is no backtracking.
pub struct OpNodeReader<'a> {
    buf: &'a [u8],
    offset: usize,
    op_table: HashMap<u16, Rc<Op>>,
}

impl<'a> OpNodeReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            offset: 0,
            op_table: HashMap::new(),
        }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(DecodeError::UnexpectedEndOfData(self.offset))?;
        let bytes = &self.buf[self.offset..end];
        self.offset = end;
        Ok(bytes)
    }

    fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let bytes = self.take(2)?;
        Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// Length-prefixed UTF-8 text; a zero length encodes the absent string.
    fn read_text(&mut self) -> Result<Option<String>, DecodeError> {
        let len = self.read_u16()? as usize;
        if len == 0 {
            return Ok(None);
        }
        let start = self.offset;
        let bytes = self.take(len)?;
        let text = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8(start))?;
        Ok(Some(text.to_string()))
    }

    fn read_op(&mut self) -> Result<Rc<Op>, DecodeError> {
        let at = self.offset;
        let tagged_handle = self.read_u16()?;
        let handle = tagged_handle >> 1;

        if tagged_handle & 1 == 0 {
            let name = self.read_text()?.ok_or(DecodeError::NullOpName(at))?;
            let schema = self.read_text()?;
            self.op_table.insert(
                handle,
                Rc::new(Op {
                    handle,
                    name,
                    schema,
                }),
            );
        }

        self.op_table
            .get(&handle)
            .cloned()
            .ok_or(DecodeError::UnknownHandle(handle))
    }

    /// Read one node and its whole subtree, depth-first pre-order: the
    /// parent's fields precede all of its children's subtrees.
    pub fn read_op_node(&mut self) -> Result<Rc<OpNode>, DecodeError> {
        let op = self.read_op()?;
        let invocation_count = self.read_u32()?;
        // Raw durations are microseconds; the model carries nanoseconds.
        let cuml_total_duration_ns = u64::from(self.read_u32()?) * 1000;

        let child_count = self.read_u16()?;
        let mut children = Vec::with_capacity(usize::from(child_count));
        for _ in 0..child_count {
            children.push(self.read_op_node()?);
        }

        Ok(Rc::new(OpNode {
            op,
            invocation_count,
            cuml_total_duration_ns,
            children,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    struct Enc(Vec<u8>);

    impl Enc {
        fn new() -> Self {
            Self(Vec::new())
        }

        fn u16(mut self, v: u16) -> Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }

        fn u32(mut self, v: u32) -> Self {
            self.0.extend_from_slice(&v.to_le_bytes());
            self
        }

        fn text(self, s: Option<&str>) -> Self {
            match s {
                None => self.u16(0),
                Some(s) => {
                    let mut enc = self.u16(s.len() as u16);
                    enc.0.extend_from_slice(s.as_bytes());
                    enc
                }
            }
        }

        fn def(self, handle: u16, name: &str, schema: Option<&str>) -> Self {
            self.u16(handle << 1).text(Some(name)).text(schema)
        }

        fn reference(self, handle: u16) -> Self {
            self.u16(handle << 1 | 1)
        }

        fn counters(self, count: u32, raw_duration_us: u32, child_count: u16) -> Self {
            self.u32(count).u32(raw_duration_us).u16(child_count)
        }
    }

    #[test]
    fn concrete_two_node_scenario() {
        let buf = Enc::new()
            .def(0, "root", None)
            .counters(1, 2, 1)
            .def(1, "leaf", Some("sig()"))
            .counters(3, 4, 0)
            .0;

        let root = decode_profile(&buf).unwrap();

        assert_eq!(root.op.handle, 0);
        assert_eq!(root.op.name, "root");
        assert_eq!(root.op.schema, None);
        assert_eq!(root.invocation_count, 1);
        assert_eq!(root.cuml_total_duration_ns, 2000);
        assert_eq!(root.children.len(), 1);

        let child = &root.children[0];
        assert_eq!(child.op.name, "leaf");
        assert_eq!(child.op.schema.as_deref(), Some("sig()"));
        assert_eq!(child.invocation_count, 3);
        assert_eq!(child.cuml_total_duration_ns, 4000);
        assert_eq!(child.children.len(), 0);
    }

    #[test]
    fn nested_structure_round_trip() {
        // root -> (a -> (b), c), children in stream order.
        let buf = Enc::new()
            .def(0, "root", None)
            .counters(1, 100, 2)
            .def(1, "a", None)
            .counters(2, 50, 1)
            .def(2, "b", None)
            .counters(3, 25, 0)
            .def(3, "c", None)
            .counters(4, 10, 0)
            .0;

        let root = decode_profile(&buf).unwrap();

        let names: Vec<&str> = root.children.iter().map(|c| c.op.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(root.children[0].children[0].op.name, "b");
        assert_eq!(root.children[0].children[0].invocation_count, 3);
        assert_eq!(root.children[1].children.len(), 0);
    }

    #[test]
    fn references_share_one_op_instance() {
        let buf = Enc::new()
            .def(0, "root", None)
            .counters(1, 10, 2)
            .def(1, "conv", Some("conv(x)"))
            .counters(1, 3, 0)
            .reference(1)
            .counters(2, 4, 0)
            .0;

        let root = decode_profile(&buf).unwrap();

        let first = &root.children[0];
        let second = &root.children[1];
        assert!(Rc::ptr_eq(&first.op, &second.op));
        assert_eq!(second.op.name, "conv");
        assert_eq!(second.op.schema.as_deref(), Some("conv(x)"));
        // Counters still differ per node.
        assert_eq!(first.invocation_count, 1);
        assert_eq!(second.invocation_count, 2);
    }

    #[test]
    fn reference_before_definition_fails() {
        let buf = Enc::new().reference(7).counters(1, 1, 0).0;

        assert_eq!(
            decode_profile(&buf).unwrap_err(),
            DecodeError::UnknownHandle(7)
        );
    }

    #[test]
    fn definition_without_name_fails() {
        let buf = Enc::new()
            .u16(0) // tagged handle 0, definition flag
            .text(None) // a definition must carry a name
            .text(None)
            .counters(1, 1, 0)
            .0;

        assert_eq!(decode_profile(&buf).unwrap_err(), DecodeError::NullOpName(0));
    }

    #[test]
    fn raw_duration_is_scaled_to_nanoseconds() {
        let buf = Enc::new().def(0, "op", None).counters(1, 5, 0).0;

        let root = decode_profile(&buf).unwrap();
        assert_eq!(root.cuml_total_duration_ns, 5000);
    }

    #[test]
    fn truncated_buffer_fails() {
        let full = Enc::new().def(0, "root", None).counters(1, 2, 0).0;

        // Every proper prefix must fail with an end-of-data error, never panic.
        for cut in 0..full.len() {
            assert!(matches!(
                decode_profile(&full[..cut]).unwrap_err(),
                DecodeError::UnexpectedEndOfData(_)
            ));
        }
    }

    #[test]
    fn invalid_utf8_in_name_fails() {
        // Definition of handle 0 whose name bytes are not valid UTF-8.
        let mut enc = Enc::new().u16(0).u16(2);
        enc.0.extend_from_slice(&[0xff, 0xfe]);
        let buf = enc.text(None).counters(1, 1, 0).0;

        assert_eq!(decode_profile(&buf).unwrap_err(), DecodeError::InvalidUtf8(4));
    }

    #[test]
    fn missing_children_truncate_decode() {
        // Declares two children but encodes none.
        let buf = Enc::new().def(0, "root", None).counters(1, 1, 2).0;

        assert!(matches!(
            decode_profile(&buf).unwrap_err(),
            DecodeError::UnexpectedEndOfData(_)
        ));
    }
}
