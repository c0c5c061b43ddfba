// Document decoder: walks a cursor over the wire format and writes decoded
// elements into a `Value` tree.
//
// Recursion depth equals document nesting depth and is bounded by
// `DecodeOptions::max_depth`. Any failure aborts the whole decode; values
// written before the failure stay in the target tree.

use log::{debug, trace, warn};

use super::cursor::Cursor;
use super::element::{ElementType, TERMINATOR};
use super::error::{DecodeError, ErrorKind};
use crate::value::{Map, Value};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Default nesting limit, counting the root document as depth 1.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default ceiling for array indices parsed from element keys.
pub const DEFAULT_MAX_ARRAY_INDEX: usize = 1 << 20;

/// How the keys of the top-level document are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RootContext {
    /// Keys are parsed as array indices (the historical framing).
    #[default]
    Array,
    /// Keys are kept as map keys.
    Map,
}

/// Handling of the code-with-scope element (tag 0x0F).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeWithScope {
    /// Fail with `ErrorKind::UnsupportedType`.
    #[default]
    Reject,
    /// Consume exactly the declared length and write nothing.
    Skip,
}

/// Configuration for document decoding.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Maximum document nesting depth (root = 1).
    pub max_depth: usize,
    /// Key interpretation for the top-level document.
    pub root: RootContext,
    /// Behaviour for tag 0x0F.
    pub code_with_scope: CodeWithScope,
    /// Largest index accepted from an array-context key.
    pub max_array_index: usize,
    /// Require every document to end exactly at its declared length.
    pub verify_length: bool,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            root: RootContext::Array,
            code_with_scope: CodeWithScope::Reject,
            max_array_index: DEFAULT_MAX_ARRAY_INDEX,
            verify_length: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Stats and listing
// ---------------------------------------------------------------------------

/// Counters collected during one decode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecodeStats {
    /// Bytes consumed from the input, including the root terminator.
    pub bytes_consumed: usize,
    /// Elements decoded, at any depth.
    pub elements: u64,
    /// Documents and arrays entered, including the root.
    pub documents: u64,
    /// Deepest nesting reached (root = 1).
    pub max_depth: usize,
}

/// Location and shape of one decoded element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementInfo {
    /// Offset of the type tag.
    pub offset: usize,
    /// Depth of the enclosing document (root = 1).
    pub depth: usize,
    pub element_type: ElementType,
    /// Raw key, lossily converted to UTF-8.
    pub key: String,
    /// Bytes occupied by the payload.
    pub payload_len: usize,
}

// ---------------------------------------------------------------------------
// Decoder
// ---------------------------------------------------------------------------

enum Slot<'a> {
    Key(&'a [u8]),
    Index(usize),
}

/// Single-use decoder over one input range.
pub struct Decoder<'a> {
    cursor: Cursor<'a>,
    options: DecodeOptions,
    stats: DecodeStats,
    listing: Option<Vec<ElementInfo>>,
    /// `Undef` slots still allowed for array gaps, across the whole input.
    padding_budget: usize,
}

impl<'a> Decoder<'a> {
    pub fn new(data: &'a [u8], options: &DecodeOptions) -> Self {
        Self {
            cursor: Cursor::new(data),
            options: options.clone(),
            stats: DecodeStats::default(),
            listing: None,
            padding_budget: data.len(),
        }
    }

    /// Also record an [`ElementInfo`] for every element decoded.
    pub fn with_listing(mut self) -> Self {
        self.listing = Some(Vec::new());
        self
    }

    /// Decode the top-level document into `root`.
    pub fn decode(mut self, root: &mut Value) -> Result<DecodeStats, DecodeError> {
        self.run(root)
    }

    /// Decode and return the element listing alongside the stats.
    pub fn decode_listing(
        mut self,
        root: &mut Value,
    ) -> Result<(DecodeStats, Vec<ElementInfo>), DecodeError> {
        if self.listing.is_none() {
            self.listing = Some(Vec::new());
        }
        let stats = self.run(root)?;
        Ok((stats, self.listing.take().unwrap_or_default()))
    }

    fn run(&mut self, root: &mut Value) -> Result<DecodeStats, DecodeError> {
        debug!(
            "decoding {} bytes (root context {:?})",
            self.cursor.len(),
            self.options.root
        );
        let is_array = self.options.root == RootContext::Array;
        self.decode_document(root, is_array, 1)?;
        self.stats.bytes_consumed = self.cursor.position();
        debug!(
            "decoded {} elements in {} documents, {} of {} bytes consumed",
            self.stats.elements,
            self.stats.documents,
            self.stats.bytes_consumed,
            self.cursor.len()
        );
        Ok(self.stats)
    }

    fn decode_document(
        &mut self,
        target: &mut Value,
        is_array: bool,
        depth: usize,
    ) -> Result<(), DecodeError> {
        let start = self.cursor.position();
        if depth > self.options.max_depth {
            return Err(DecodeError::new(
                ErrorKind::DepthExceeded,
                start,
                format!("nesting exceeds {} levels", self.options.max_depth),
            ));
        }
        self.stats.documents += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        // The declared length is a sanity check only; element reads are
        // bounded by the cursor, not by this value.
        let declared = self.cursor.read_u32()? as usize;
        let available = self.cursor.remaining() + 4;
        if declared > available {
            return Err(DecodeError::new(
                ErrorKind::MalformedLength,
                start,
                format!("declared length {declared} exceeds {available} available bytes"),
            ));
        }

        loop {
            let tag_offset = self.cursor.position();
            let tag = self.cursor.read_u8()?;
            if tag == TERMINATOR {
                break;
            }

            let key_offset = self.cursor.position();
            let key = self.cursor.read_cstring()?;
            let slot = if is_array {
                let filled = target.as_array().map_or(0, <[Value]>::len);
                Slot::Index(self.array_index(key, key_offset, filled)?)
            } else {
                Slot::Key(key)
            };

            let element_type = ElementType::from_tag(tag).ok_or_else(|| {
                DecodeError::new(
                    ErrorKind::UnknownType(tag),
                    tag_offset,
                    format!("element {:?}", String::from_utf8_lossy(key)),
                )
            })?;

            let payload_offset = self.cursor.position();
            let value = self.decode_payload(element_type, tag_offset, depth)?;
            let payload_len = self.cursor.position() - payload_offset;
            self.stats.elements += 1;

            trace!(
                "{} {:?} at {tag_offset} ({payload_len} payload bytes)",
                element_type.name(),
                String::from_utf8_lossy(key)
            );
            if let Some(listing) = self.listing.as_mut() {
                listing.push(ElementInfo {
                    offset: tag_offset,
                    depth,
                    element_type,
                    key: String::from_utf8_lossy(key).into_owned(),
                    payload_len,
                });
            }

            if let Some(value) = value {
                match slot {
                    Slot::Key(k) => target.set_key(String::from_utf8_lossy(k), value),
                    Slot::Index(i) => target.set_index(i, value),
                }
            }
        }

        if self.options.verify_length {
            let consumed = self.cursor.position() - start;
            if consumed != declared {
                return Err(DecodeError::new(
                    ErrorKind::LengthMismatch,
                    start,
                    format!("declared length {declared}, consumed {consumed}"),
                ));
            }
        }

        Ok(())
    }

    /// Decode one payload. `None` means the element is consumed but not
    /// stored.
    fn decode_payload(
        &mut self,
        element_type: ElementType,
        tag_offset: usize,
        depth: usize,
    ) -> Result<Option<Value>, DecodeError> {
        let value = match element_type {
            ElementType::Double => Value::Float(self.cursor.read_f64()?),
            ElementType::String | ElementType::Code | ElementType::Symbol => {
                Value::Bytes(self.cursor.read_string()?.to_vec())
            }
            ElementType::Document => {
                let mut child = Value::Map(Map::new());
                self.decode_document(&mut child, false, depth + 1)?;
                child
            }
            ElementType::Array => {
                let mut child = Value::Array(Vec::new());
                self.decode_document(&mut child, true, depth + 1)?;
                child
            }
            ElementType::Binary => Value::Bytes(self.cursor.read_binary()?.to_vec()),
            ElementType::Undefined | ElementType::Null => Value::Undef,
            ElementType::ObjectId => Value::Bytes(self.cursor.read_object_id()?.to_vec()),
            ElementType::Boolean => Value::Int(i64::from(self.cursor.read_u8()?)),
            ElementType::DateTime | ElementType::Timestamp | ElementType::Int64 => {
                Value::Int(self.cursor.read_u64()? as i64)
            }
            ElementType::Regex => {
                let pattern = self.cursor.read_cstring()?;
                let flags = self.cursor.read_cstring()?;
                Value::Bytes(join_slash(pattern, flags))
            }
            ElementType::DbPointer => {
                let namespace = self.cursor.read_cstring()?;
                let oid = self.cursor.read_object_id()?;
                Value::Bytes(join_slash(namespace, oid))
            }
            ElementType::CodeWithScope => return self.code_with_scope(tag_offset),
            ElementType::Int32 => Value::Int(i64::from(self.cursor.read_u32()?)),
        };
        Ok(Some(value))
    }

    fn code_with_scope(&mut self, tag_offset: usize) -> Result<Option<Value>, DecodeError> {
        match self.options.code_with_scope {
            CodeWithScope::Reject => Err(DecodeError::new(
                ErrorKind::UnsupportedType(ElementType::CodeWithScope.tag()),
                tag_offset,
                "code with scope is not supported",
            )),
            CodeWithScope::Skip => {
                let len_offset = self.cursor.position();
                let declared = self.cursor.read_u32()? as usize;
                if declared < 4 {
                    return Err(DecodeError::new(
                        ErrorKind::MalformedLength,
                        len_offset,
                        format!("code with scope length {declared} is shorter than its length field"),
                    ));
                }
                self.cursor.skip(declared - 4)?;
                warn!("skipped code with scope element at offset {tag_offset} ({declared} bytes)");
                Ok(None)
            }
        }
    }

    /// Resolve an array key against an array currently holding `filled`
    /// slots.
    ///
    /// Gaps past the end are padded with `Undef`. The total padding over
    /// one decode may not exceed the input length, so a short input cannot
    /// inflate into a huge tree through sparse keys.
    fn array_index(
        &mut self,
        key: &[u8],
        key_offset: usize,
        filled: usize,
    ) -> Result<usize, DecodeError> {
        let index = parse_index(key);
        if index > self.options.max_array_index {
            return Err(DecodeError::new(
                ErrorKind::IndexOutOfRange,
                key_offset,
                format!(
                    "index {index} exceeds limit {}",
                    self.options.max_array_index
                ),
            ));
        }
        let gap = index.saturating_sub(filled);
        if gap > self.padding_budget {
            return Err(DecodeError::new(
                ErrorKind::IndexOutOfRange,
                key_offset,
                format!(
                    "index {index} leaves a gap of {gap} slots, {} padding slots left",
                    self.padding_budget
                ),
            ));
        }
        self.padding_budget -= gap;
        Ok(index)
    }
}

fn join_slash(a: &[u8], b: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(a.len() + 1 + b.len());
    out.extend_from_slice(a);
    out.push(b'/');
    out.extend_from_slice(b);
    out
}

/// Permissive decimal parse of an array-context key.
///
/// Leading ASCII whitespace and a `+` sign are accepted; parsing stops at
/// the first non-digit. Empty, non-numeric and negative keys yield 0.
/// Overflow saturates.
pub fn parse_index(key: &[u8]) -> usize {
    let mut rest = key.trim_ascii_start();
    let mut negative = false;
    match rest.split_first() {
        Some((&b'-', tail)) => {
            negative = true;
            rest = tail;
        }
        Some((&b'+', tail)) => rest = tail,
        _ => {}
    }
    let mut value = 0usize;
    for &b in rest {
        if !b.is_ascii_digit() {
            break;
        }
        value = value.saturating_mul(10).saturating_add(usize::from(b - b'0'));
    }
    if negative { 0 } else { value }
}

// ---------------------------------------------------------------------------
// High-level convenience
// ---------------------------------------------------------------------------

/// Decode `data` into `root` with default options (array-context root).
pub fn decode(data: &[u8], root: &mut Value) -> Result<DecodeStats, DecodeError> {
    decode_with_options(data, root, &DecodeOptions::default())
}

pub fn decode_with_options(
    data: &[u8],
    root: &mut Value,
    options: &DecodeOptions,
) -> Result<DecodeStats, DecodeError> {
    Decoder::new(data, options).decode(root)
}

/// Decode into a fresh tree.
pub fn decode_to_value(data: &[u8], options: &DecodeOptions) -> Result<Value, DecodeError> {
    let mut root = Value::Undef;
    Decoder::new(data, options).decode(&mut root)?;
    Ok(root)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: u8, key: &str, payload: &[u8]) -> Vec<u8> {
        let mut out = vec![tag];
        out.extend_from_slice(key.as_bytes());
        out.push(0);
        out.extend_from_slice(payload);
        out
    }

    fn document(elements: &[Vec<u8>]) -> Vec<u8> {
        let body: Vec<u8> = elements.concat();
        let len = (4 + body.len() + 1) as u32;
        let mut out = len.to_le_bytes().to_vec();
        out.extend_from_slice(&body);
        out.push(0);
        out
    }

    fn string_payload(s: &str) -> Vec<u8> {
        let mut out = ((s.len() + 1) as u32).to_le_bytes().to_vec();
        out.extend_from_slice(s.as_bytes());
        out.push(0);
        out
    }

    fn map_opts() -> DecodeOptions {
        DecodeOptions {
            root: RootContext::Map,
            ..Default::default()
        }
    }

    #[test]
    fn every_scalar_tag() {
        let oid: Vec<u8> = (1..=12).collect();
        let mut dbptr = b"ns\0".to_vec();
        dbptr.extend_from_slice(&oid);
        let data = document(&[
            element(0x01, "d", &2.25f64.to_le_bytes()),
            element(0x02, "s", &string_payload("str")),
            element(0x05, "bin", &[2, 0, 0, 0, 0xDE, 0xAD]),
            element(0x06, "u", &[]),
            element(0x07, "oid", &oid),
            element(0x08, "t", &[1]),
            element(0x09, "dt", &1_700_000_000_000i64.to_le_bytes()),
            element(0x0A, "nil", &[]),
            element(0x0B, "re", b"^a.*\0i\0"),
            element(0x0C, "ptr", &dbptr),
            element(0x0D, "js", &string_payload("f()")),
            element(0x0E, "sym", &string_payload("sym")),
            element(0x10, "i", &42u32.to_le_bytes()),
            element(0x11, "ts", &7u64.to_le_bytes()),
            element(0x12, "l", &(-9i64).to_le_bytes()),
        ]);

        let root = decode_to_value(&data, &map_opts()).unwrap();
        assert_eq!(root.get("d"), Some(&Value::Float(2.25)));
        assert_eq!(root.get("s").unwrap().as_str(), Some("str"));
        assert_eq!(root.get("bin").unwrap().as_bytes(), Some(&[0xDE, 0xAD][..]));
        assert!(root.get("u").unwrap().is_undef());
        assert_eq!(root.get("oid").unwrap().as_bytes(), Some(&oid[..]));
        assert_eq!(root.get("t"), Some(&Value::Int(1)));
        assert_eq!(root.get("dt"), Some(&Value::Int(1_700_000_000_000)));
        assert!(root.get("nil").unwrap().is_undef());
        assert_eq!(root.get("re").unwrap().as_str(), Some("^a.*/i"));
        let mut expected_ptr = b"ns/".to_vec();
        expected_ptr.extend_from_slice(&oid);
        assert_eq!(root.get("ptr").unwrap().as_bytes(), Some(&expected_ptr[..]));
        assert_eq!(root.get("js").unwrap().as_str(), Some("f()"));
        assert_eq!(root.get("sym").unwrap().as_str(), Some("sym"));
        assert_eq!(root.get("i"), Some(&Value::Int(42)));
        assert_eq!(root.get("ts"), Some(&Value::Int(7)));
        assert_eq!(root.get("l"), Some(&Value::Int(-9)));
        assert_eq!(root.len(), 15);
    }

    #[test]
    fn int32_is_read_unsigned() {
        let data = document(&[element(0x10, "n", &(-1i32).to_le_bytes())]);
        let root = decode_to_value(&data, &map_opts()).unwrap();
        assert_eq!(root.get("n"), Some(&Value::Int(i64::from(u32::MAX))));
    }

    #[test]
    fn root_defaults_to_array_context() {
        let data = document(&[
            element(0x02, "1", &string_payload("b")),
            element(0x02, "0", &string_payload("a")),
        ]);
        let root = decode_to_value(&data, &DecodeOptions::default()).unwrap();
        let items = root.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_str(), Some("a"));
        assert_eq!(items[1].as_str(), Some("b"));
    }

    #[test]
    fn nested_documents_and_stats() {
        let inner = document(&[element(0x10, "x", &1u32.to_le_bytes())]);
        let arr = document(&[
            element(0x03, "0", &inner),
            element(0x08, "1", &[0]),
        ]);
        let data = document(&[element(0x04, "list", &arr)]);

        let mut root = Value::Undef;
        let stats = decode_with_options(&data, &mut root, &map_opts()).unwrap();
        let list = root.get("list").unwrap().as_array().unwrap();
        assert_eq!(list[0].get("x"), Some(&Value::Int(1)));
        assert_eq!(list[1], Value::Int(0));

        assert_eq!(stats.bytes_consumed, data.len());
        assert_eq!(stats.documents, 3);
        assert_eq!(stats.elements, 4);
        assert_eq!(stats.max_depth, 3);
    }

    #[test]
    fn empty_nested_containers_keep_their_shape() {
        let data = document(&[
            element(0x03, "m", &document(&[])),
            element(0x04, "a", &document(&[])),
        ]);
        let root = decode_to_value(&data, &map_opts()).unwrap();
        assert_eq!(root.get("m"), Some(&Value::Map(Map::new())));
        assert_eq!(root.get("a"), Some(&Value::Array(Vec::new())));
    }

    #[test]
    fn unknown_tag_fails_at_tag_offset() {
        let mut data = document(&[element(0x02, "ok", &string_payload("v"))]);
        let tag_offset = data.len() - 1;
        data.pop();
        data.extend_from_slice(&element(0x42, "bad", &[]));
        data.push(0);
        let len = data.len() as u32;
        data[..4].copy_from_slice(&len.to_le_bytes());

        let err = decode_to_value(&data, &map_opts()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownType(0x42));
        assert_eq!(err.offset, tag_offset);
    }

    #[test]
    fn code_with_scope_rejected_by_default() {
        let scope = document(&[]);
        let mut cws = ((4 + 6 + scope.len()) as u32).to_le_bytes().to_vec();
        cws.extend_from_slice(&string_payload("x"));
        cws.extend_from_slice(&scope);
        let data = document(&[element(0x0F, "c", &cws)]);

        let err = decode_to_value(&data, &map_opts()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedType(0x0F));
        assert_eq!(err.offset, 4);
    }

    #[test]
    fn code_with_scope_skip_consumes_declared_length() {
        let scope = document(&[]);
        let mut cws = ((4 + 6 + scope.len()) as u32).to_le_bytes().to_vec();
        cws.extend_from_slice(&string_payload("x"));
        cws.extend_from_slice(&scope);
        let data = document(&[
            element(0x0F, "c", &cws),
            element(0x10, "after", &5u32.to_le_bytes()),
        ]);

        let opts = DecodeOptions {
            root: RootContext::Map,
            code_with_scope: CodeWithScope::Skip,
            verify_length: true,
            ..Default::default()
        };
        let root = decode_to_value(&data, &opts).unwrap();
        assert_eq!(root.get("c"), None);
        assert_eq!(root.get("after"), Some(&Value::Int(5)));
    }

    #[test]
    fn code_with_scope_skip_rejects_short_length() {
        let data = document(&[element(0x0F, "c", &2u32.to_le_bytes())]);
        let opts = DecodeOptions {
            code_with_scope: CodeWithScope::Skip,
            ..map_opts()
        };
        let err = decode_to_value(&data, &opts).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedLength);
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut data = document(&[]);
        for _ in 0..10 {
            data = document(&[element(0x03, "n", &data)]);
        }
        let ok = DecodeOptions {
            max_depth: 11,
            ..map_opts()
        };
        assert!(decode_to_value(&data, &ok).is_ok());

        let tight = DecodeOptions {
            max_depth: 10,
            ..map_opts()
        };
        let err = decode_to_value(&data, &tight).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DepthExceeded);
    }

    #[test]
    fn array_index_limit_is_enforced() {
        let data = document(&[element(0x0A, "5000", &[])]);
        let opts = DecodeOptions {
            max_array_index: 4999,
            ..Default::default()
        };
        let err = decode_to_value(&data, &opts).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexOutOfRange);
        assert_eq!(err.offset, 5);
    }

    #[test]
    fn sparse_array_padding_is_bounded_by_input() {
        let sparse = document(&[element(0x0A, "100", &[])]);
        let filler = element(0x02, "pad", &string_payload(&"x".repeat(150)));

        // One gap of 100 fits within the input length.
        let data = document(&[element(0x04, "a", &sparse), filler.clone()]);
        let root = decode_to_value(&data, &map_opts()).unwrap();
        let a = root.get("a").unwrap();
        assert_eq!(a.len(), 101);
        assert!(a.as_array().unwrap().iter().all(Value::is_undef));

        // A second gap of 100 exceeds what is left of the budget.
        let data = document(&[
            element(0x04, "a", &sparse),
            element(0x04, "b", &sparse),
            filler,
        ]);
        assert!(data.len() >= 100 && data.len() < 200);
        let err = decode_to_value(&data, &map_opts()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexOutOfRange);
        let second = 4 + element(0x04, "a", &sparse).len();
        assert_eq!(err.offset, second + 3 + 4 + 1);
    }

    #[test]
    fn many_sparse_arrays_fail_fast() {
        let sparse = document(&[element(0x0A, "1048576", &[])]);
        let elements: Vec<Vec<u8>> = (0..500)
            .map(|i| element(0x04, &format!("k{i}"), &sparse))
            .collect();
        let data = document(&elements);

        let mut root = Value::Undef;
        let err = Decoder::new(&data, &map_opts())
            .decode(&mut root)
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::IndexOutOfRange);
        // Fails on the first sparse array, before any padding is stored.
        assert!(root.is_undef());
    }

    #[test]
    fn dense_arrays_spend_no_padding() {
        let items: Vec<Vec<u8>> = (0..64)
            .map(|i| element(0x10, &i.to_string(), &[1, 0, 0, 0]))
            .collect();
        let data = document(&items);
        let root = decode_to_value(&data, &DecodeOptions::default()).unwrap();
        assert_eq!(root.len(), 64);
    }

    #[test]
    fn verify_length_catches_overstated_length() {
        let mut data = document(&[element(0x08, "b", &[1])]);
        data.extend_from_slice(&[0, 0]);
        let len = data.len() as u32;
        data[..4].copy_from_slice(&len.to_le_bytes());

        // Lenient by default.
        assert!(decode_to_value(&data, &map_opts()).is_ok());

        let strict = DecodeOptions {
            verify_length: true,
            ..map_opts()
        };
        let err = decode_to_value(&data, &strict).unwrap_err();
        assert_eq!(err.kind, ErrorKind::LengthMismatch);
        assert_eq!(err.offset, 0);
    }

    #[test]
    fn zero_length_string_is_malformed() {
        let data = document(&[element(0x02, "s", &0u32.to_le_bytes())]);
        let err = decode_to_value(&data, &map_opts()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedLength);
    }

    #[test]
    fn listing_records_offsets_and_depths() {
        let inner = document(&[element(0x08, "b", &[1])]);
        let data = document(&[
            element(0x10, "i", &3u32.to_le_bytes()),
            element(0x03, "doc", &inner),
        ]);
        let mut root = Value::Undef;
        let (_, listing) = Decoder::new(&data, &map_opts())
            .decode_listing(&mut root)
            .unwrap();

        assert_eq!(listing.len(), 3);
        assert_eq!(listing[0].offset, 4);
        assert_eq!(listing[0].element_type, ElementType::Int32);
        assert_eq!(listing[0].payload_len, 4);
        // Children are recorded before their parent completes.
        assert_eq!(listing[1].key, "b");
        assert_eq!(listing[1].depth, 2);
        assert_eq!(listing[2].key, "doc");
        assert_eq!(listing[2].payload_len, inner.len());
    }

    #[test]
    fn parse_index_is_permissive() {
        assert_eq!(parse_index(b"0"), 0);
        assert_eq!(parse_index(b"17"), 17);
        assert_eq!(parse_index(b"  8"), 8);
        assert_eq!(parse_index(b"+3"), 3);
        assert_eq!(parse_index(b"12abc"), 12);
        assert_eq!(parse_index(b"x"), 0);
        assert_eq!(parse_index(b""), 0);
        assert_eq!(parse_index(b"-4"), 0);
        assert_eq!(parse_index(b"99999999999999999999999999"), usize::MAX);
    }
}
