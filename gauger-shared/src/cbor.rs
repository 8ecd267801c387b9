//! CBOR output sink.
//!
//! Writes definite-length CBOR with minimal-width integer heads and
//! preferred (shortest lossless) float serialization. Array and map heads
//! are patched in when the composite is closed, so the traversal never has
//! to know child counts up front.
//!
//! The same traversal runs in two modes: [`SliceSink`] writes into a
//! caller-supplied fixed buffer, [`SizeSink`] only accumulates the byte
//! count so a buffer can be sized before allocating it. A full buffer is a
//! latched error: all later operations turn into no-ops and the failure
//! surfaces at [`Encoder::finish`].
//!
//! An [`Encoder`] is single-writer by construction: it owns its sink for
//! the whole encode and is not `Sync`-shared anywhere.

use crate::encode::EncodeError;

const MAJOR_UINT: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_BYTES: u8 = 2;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;

/// Deepest open-composite nesting the schema can produce, with headroom.
pub const MAX_NESTING: usize = 10;

/// Byte destination of one encode pass.
pub trait Sink {
    type Output;

    /// Place `bytes` at offset `at`. `false` means they did not fit.
    fn write(&mut self, at: usize, bytes: &[u8]) -> bool;

    /// Make room for `head` at offset `at` by shifting `at..end` up,
    /// then place it. `false` means the shifted tail did not fit.
    fn insert(&mut self, at: usize, end: usize, head: &[u8]) -> bool;

    fn finish(self, len: usize) -> Self::Output;
}

/// Measuring mode: counts bytes, writes nothing.
pub struct SizeSink;

impl Sink for SizeSink {
    type Output = usize;

    fn write(&mut self, _at: usize, _bytes: &[u8]) -> bool {
        true
    }

    fn insert(&mut self, _at: usize, _end: usize, _head: &[u8]) -> bool {
        true
    }

    fn finish(self, len: usize) -> usize {
        len
    }
}

/// Writing mode: backed by a caller-supplied fixed-capacity buffer.
pub struct SliceSink<'a> {
    buf: &'a mut [u8],
}

impl<'a> SliceSink<'a> {
    pub fn new(buf: &'a mut [u8]) -> Self {
        SliceSink { buf }
    }
}

impl<'a> Sink for SliceSink<'a> {
    type Output = &'a [u8];

    fn write(&mut self, at: usize, bytes: &[u8]) -> bool {
        let end = at + bytes.len();
        if end > self.buf.len() {
            return false;
        }
        self.buf[at..end].copy_from_slice(bytes);
        true
    }

    fn insert(&mut self, at: usize, end: usize, head: &[u8]) -> bool {
        let n = head.len();
        if end + n > self.buf.len() {
            return false;
        }
        self.buf.copy_within(at..end, at + n);
        self.buf[at..at + n].copy_from_slice(head);
        true
    }

    fn finish(self, len: usize) -> &'a [u8] {
        let buf = self.buf;
        &buf[..len]
    }
}

#[derive(Clone, Copy, Default)]
struct Level {
    start: usize,
    items: usize,
    map: bool,
}

pub struct Encoder<S: Sink> {
    sink: S,
    len: usize,
    levels: [Level; MAX_NESTING],
    depth: usize,
    overflow: bool,
}

impl<S: Sink> Encoder<S> {
    pub fn new(sink: S) -> Self {
        Encoder {
            sink,
            len: 0,
            levels: [Level::default(); MAX_NESTING],
            depth: 0,
            overflow: false,
        }
    }

    /// Count one finished item towards the enclosing composite.
    fn bump(&mut self) {
        if self.depth > 0 {
            self.levels[self.depth - 1].items += 1;
        }
    }

    fn put(&mut self, bytes: &[u8]) {
        if self.overflow {
            return;
        }
        if self.sink.write(self.len, bytes) {
            self.len += bytes.len();
        } else {
            self.overflow = true;
        }
    }

    fn put_head(&mut self, major: u8, value: u64) {
        let mut head = [0u8; 9];
        let n = head_bytes(major, value, &mut head);
        self.put(&head[..n]);
    }

    pub fn add_u64(&mut self, value: u64) {
        self.bump();
        self.put_head(MAJOR_UINT, value);
    }

    pub fn add_i64(&mut self, value: i64) {
        self.bump();
        if value >= 0 {
            self.put_head(MAJOR_UINT, value as u64);
        } else {
            self.put_head(MAJOR_NEGATIVE, !(value as u64));
        }
    }

    /// Emits the shortest of half, single and double precision that holds
    /// `value` losslessly.
    pub fn add_f64(&mut self, value: f64) {
        self.bump();
        if let Some(single) = shrink_to_single(value) {
            if let Some(half) = shrink_to_half(single) {
                let mut out = [0xf9, 0, 0];
                out[1..].copy_from_slice(&half.to_be_bytes());
                self.put(&out);
            } else {
                let mut out = [0u8; 5];
                out[0] = 0xfa;
                out[1..].copy_from_slice(&single.to_bits().to_be_bytes());
                self.put(&out);
            }
        } else {
            let mut out = [0u8; 9];
            out[0] = 0xfb;
            out[1..].copy_from_slice(&value.to_bits().to_be_bytes());
            self.put(&out);
        }
    }

    pub fn add_bool(&mut self, value: bool) {
        self.bump();
        self.put(&[if value { 0xf5 } else { 0xf4 }]);
    }

    pub fn add_text(&mut self, text: &str) {
        self.bump();
        self.put_head(MAJOR_TEXT, text.len() as u64);
        self.put(text.as_bytes());
    }

    pub fn add_bytes(&mut self, bytes: &[u8]) {
        self.bump();
        self.put_head(MAJOR_BYTES, bytes.len() as u64);
        self.put(bytes);
    }

    pub fn open_array(&mut self) {
        self.open(false);
    }

    pub fn open_map(&mut self) {
        self.open(true);
    }

    /// Opens an array as the value of `label` in the enclosing map.
    pub fn open_array_in_map(&mut self, label: i64) {
        assert!(
            self.depth > 0 && self.levels[self.depth - 1].map,
            "labeled item outside of a map"
        );
        self.add_i64(label);
        self.open_array();
    }

    fn open(&mut self, map: bool) {
        assert!(self.depth < MAX_NESTING, "nesting deeper than MAX_NESTING");
        self.bump();
        self.levels[self.depth] = Level {
            start: self.len,
            items: 0,
            map,
        };
        self.depth += 1;
    }

    pub fn close_array(&mut self) {
        let level = self.close();
        assert!(!level.map, "close_array on an open map");
        self.patch_head(MAJOR_ARRAY, level.items as u64, level.start);
    }

    pub fn close_map(&mut self) {
        let level = self.close();
        assert!(level.map, "close_map on an open array");
        assert!(level.items % 2 == 0, "map closed with a dangling label");
        self.patch_head(MAJOR_MAP, (level.items / 2) as u64, level.start);
    }

    fn close(&mut self) -> Level {
        assert!(self.depth > 0, "close without a matching open");
        self.depth -= 1;
        self.levels[self.depth]
    }

    fn patch_head(&mut self, major: u8, count: u64, start: usize) {
        if self.overflow {
            return;
        }
        let mut head = [0u8; 9];
        let n = head_bytes(major, count, &mut head);
        if self.sink.insert(start, self.len, &head[..n]) {
            self.len += n;
        } else {
            self.overflow = true;
        }
    }

    /// Finalize the encode. Writing mode yields the used sub-range of the
    /// buffer, measuring mode the byte count that would be required.
    pub fn finish(self) -> Result<S::Output, EncodeError> {
        assert_eq!(self.depth, 0, "finish with unclosed arrays or maps");
        if self.overflow {
            return Err(EncodeError::CapacityExceeded);
        }
        Ok(self.sink.finish(self.len))
    }
}

fn head_bytes(major: u8, value: u64, out: &mut [u8; 9]) -> usize {
    let m = major << 5;
    if value < 24 {
        out[0] = m | value as u8;
        1
    } else if value <= 0xff {
        out[0] = m | 24;
        out[1] = value as u8;
        2
    } else if value <= 0xffff {
        out[0] = m | 25;
        out[1..3].copy_from_slice(&(value as u16).to_be_bytes());
        3
    } else if value <= 0xffff_ffff {
        out[0] = m | 26;
        out[1..5].copy_from_slice(&(value as u32).to_be_bytes());
        5
    } else {
        out[0] = m | 27;
        out[1..9].copy_from_slice(&value.to_be_bytes());
        9
    }
}

fn shrink_to_single(value: f64) -> Option<f32> {
    let single = value as f32;
    if f64::from(single).to_bits() == value.to_bits() {
        Some(single)
    } else {
        None
    }
}

fn shrink_to_half(value: f32) -> Option<u16> {
    let bits = value.to_bits();
    let sign = ((bits >> 16) & 0x8000) as u16;
    let exp = ((bits >> 23) & 0xff) as i32;
    let man = bits & 0x007f_ffff;

    if exp == 0xff {
        // Infinity, or NaN whose payload fits the 10-bit mantissa.
        if man == 0 {
            return Some(sign | 0x7c00);
        }
        if man & 0x1fff == 0 {
            return Some(sign | 0x7c00 | (man >> 13) as u16);
        }
        return None;
    }
    if exp == 0 {
        // Single-precision subnormals sit far below the half range.
        return if man == 0 { Some(sign) } else { None };
    }

    let e = exp - 127;
    if e > 15 {
        return None;
    }
    if e >= -14 {
        if man & 0x1fff != 0 {
            return None;
        }
        return Some(sign | (((e + 15) as u16) << 10) | (man >> 13) as u16);
    }
    if e >= -24 {
        // Subnormal half: the implicit leading bit joins the mantissa.
        let full = 0x0080_0000 | man;
        let shift = (-e - 1) as u32;
        if full & ((1u32 << shift) - 1) != 0 {
            return None;
        }
        return Some(sign | (full >> shift) as u16);
    }
    None
}
