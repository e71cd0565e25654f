//! Tajima DST writer and reader.
//!
//! A DST file is a 512-byte ASCII header followed by 3-byte records. Each
//! record moves the frame by a delta of at most ±121 units (0.1 mm) per axis,
//! encoded as balanced-ternary digits of weight 81, 27, 9, 3 and 1 scattered
//! over the three bytes.
//!
//! ```text
//!          bit 7   bit 6   bit 5   bit 4   bit 3   bit 2   bit 1   bit 0
//! byte 0   y+1     y-1     y+9     y-9     x-9     x+9     x-1     x+1
//! byte 1   y+3     y-3     y+27    y-27    x-27    x+27    x-3     x+3
//! byte 2   jump    color   y+81    y-81    x-81    x+81    set     set
//! ```
//!
//! There is no trim record. A trim is written as three small jumps that
//! return to the starting point, which machine firmware recognises.

use tracing::{debug, warn};

use crate::error::{DecodeError, PatternError, PatternResult};
use crate::geometry::Point;
use crate::pattern::{Pattern, Run};

/// Size of the fixed header.
pub const HEADER_SIZE: usize = 512;

/// Largest delta a single record can carry on one axis.
pub const MAX_DELTA: i32 = 121;

/// Largest distance from the design center the five-digit header
/// extents can hold, in machine units.
pub const MAX_EXTENT: i32 = 99_999;

/// Machine units per millimeter.
pub const UNITS_PER_MM: f64 = 10.0;

/// The three jump deltas that spell a trim.
pub const TRIM_JUMPS: [(i32, i32); 3] = [(3, 3), (3, -6), (-6, 3)];

const END_BYTES: [u8; 3] = [0x00, 0x00, 0xF3];
const EOF_MARKER: u8 = 0x1A;

/// Record type, carried in the high bits of byte 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Stitch,
    Jump,
    ColorChange,
    End,
}

/// One decoded record: a relative move in machine units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Record {
    pub dx: i32,
    pub dy: i32,
    pub kind: RecordKind,
}

impl Record {
    pub fn new(dx: i32, dy: i32, kind: RecordKind) -> Self {
        Self { dx, dy, kind }
    }

    pub fn encode(&self) -> [u8; 3] {
        encode_delta(self.dx, self.dy, self.kind)
    }
}

// ============================================================================
// RECORD CODEC
// ============================================================================

/// One balanced-ternary digit: its weight and where its bits live.
struct Digit {
    weight: i32,
    byte: usize,
    plus_x: u8,
    minus_x: u8,
    plus_y: u8,
    minus_y: u8,
}

const DIGITS: [Digit; 5] = [
    Digit { weight: 81, byte: 2, plus_x: 0x04, minus_x: 0x08, plus_y: 0x20, minus_y: 0x10 },
    Digit { weight: 27, byte: 1, plus_x: 0x04, minus_x: 0x08, plus_y: 0x20, minus_y: 0x10 },
    Digit { weight: 9, byte: 0, plus_x: 0x04, minus_x: 0x08, plus_y: 0x20, minus_y: 0x10 },
    Digit { weight: 3, byte: 1, plus_x: 0x01, minus_x: 0x02, plus_y: 0x80, minus_y: 0x40 },
    Digit { weight: 1, byte: 0, plus_x: 0x01, minus_x: 0x02, plus_y: 0x80, minus_y: 0x40 },
];

/// Encode one record. Deltas are clamped to ±[`MAX_DELTA`]; use
/// [`split_move`] for anything larger.
pub fn encode_delta(dx: i32, dy: i32, kind: RecordKind) -> [u8; 3] {
    if kind == RecordKind::End {
        return END_BYTES;
    }

    let mut bytes = [0u8, 0u8, 0x03];
    let mut x = dx.clamp(-MAX_DELTA, MAX_DELTA);
    let mut y = dy.clamp(-MAX_DELTA, MAX_DELTA);

    for digit in &DIGITS {
        // Half the weight, rounded down: 40, 13, 4, 1, 0.
        let threshold = digit.weight / 2;
        if x > threshold {
            bytes[digit.byte] |= digit.plus_x;
            x -= digit.weight;
        } else if x < -threshold {
            bytes[digit.byte] |= digit.minus_x;
            x += digit.weight;
        }
        if y > threshold {
            bytes[digit.byte] |= digit.plus_y;
            y -= digit.weight;
        } else if y < -threshold {
            bytes[digit.byte] |= digit.minus_y;
            y += digit.weight;
        }
    }

    match kind {
        RecordKind::Jump => bytes[2] |= 0x80,
        RecordKind::ColorChange => bytes[2] |= 0xC0,
        RecordKind::Stitch | RecordKind::End => {}
    }
    bytes
}

/// Decode one record.
pub fn decode_record(bytes: [u8; 3]) -> Record {
    if bytes == END_BYTES {
        return Record::new(0, 0, RecordKind::End);
    }

    let mut dx = 0;
    let mut dy = 0;
    for digit in &DIGITS {
        let b = bytes[digit.byte];
        if b & digit.plus_x != 0 {
            dx += digit.weight;
        }
        if b & digit.minus_x != 0 {
            dx -= digit.weight;
        }
        if b & digit.plus_y != 0 {
            dy += digit.weight;
        }
        if b & digit.minus_y != 0 {
            dy -= digit.weight;
        }
    }

    let kind = match bytes[2] & 0xC0 {
        0xC0 => RecordKind::ColorChange,
        0x80 => RecordKind::Jump,
        _ => RecordKind::Stitch,
    };
    Record::new(dx, dy, kind)
}

/// Split a move into steps of at most ±[`MAX_DELTA`] per axis.
///
/// Uses the fewest steps possible: `ceil(max(|dx|, |dy|) / 121)`. Every step
/// but the last is full length on the dominant axis. A zero move yields no
/// steps.
pub fn split_move(dx: i32, dy: i32) -> Vec<(i32, i32)> {
    let mut steps = Vec::new();
    let (mut x, mut y) = (dx, dy);
    while x != 0 || y != 0 {
        let sx = x.clamp(-MAX_DELTA, MAX_DELTA);
        let sy = y.clamp(-MAX_DELTA, MAX_DELTA);
        steps.push((sx, sy));
        x -= sx;
        y -= sy;
    }
    steps
}

// ============================================================================
// WRITER
// ============================================================================

/// Converts a [`Pattern`] to DST bytes.
#[derive(Debug, Clone)]
pub struct DstWriter {
    label: String,
}

impl Default for DstWriter {
    fn default() -> Self {
        Self::new("stitchkit")
    }
}

/// Tracks the pen position in machine units while records are emitted.
struct RecordBuilder {
    records: Vec<Record>,
    x: i32,
    y: i32,
    /// Set at the start and after trims and color changes.
    travelling: bool,
}

impl RecordBuilder {
    fn push(&mut self, dx: i32, dy: i32, kind: RecordKind) {
        self.x += dx;
        self.y += dy;
        self.records.push(Record::new(dx, dy, kind));
    }

    /// Move to an absolute position; intermediate steps are jumps and the
    /// last one is `kind`. A zero-length stitch still emits one record.
    fn move_to(&mut self, x: i32, y: i32, kind: RecordKind) {
        let steps = split_move(x - self.x, y - self.y);
        if steps.is_empty() {
            if kind == RecordKind::Stitch {
                self.push(0, 0, RecordKind::Stitch);
            }
            return;
        }
        let last = steps.len() - 1;
        for (i, (dx, dy)) in steps.into_iter().enumerate() {
            self.push(dx, dy, if i == last { kind } else { RecordKind::Jump });
        }
    }

    /// Place one stitch. The first stitch after travel is reached by
    /// jumping and then sewn in place.
    fn place(&mut self, x: i32, y: i32, jump: bool) {
        if jump {
            self.move_to(x, y, RecordKind::Jump);
        } else if self.travelling {
            self.move_to(x, y, RecordKind::Jump);
            self.push(0, 0, RecordKind::Stitch);
            self.travelling = false;
        } else {
            self.move_to(x, y, RecordKind::Stitch);
        }
    }

    fn trim(&mut self) {
        for (dx, dy) in TRIM_JUMPS {
            self.push(dx, dy, RecordKind::Jump);
        }
        self.travelling = true;
    }

    fn color_change(&mut self) {
        self.push(0, 0, RecordKind::ColorChange);
        self.travelling = true;
    }
}

impl DstWriter {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Plan the record stream for a pattern, ending with the End record.
    ///
    /// Coordinates are centered on the pattern's bounding box, converted to
    /// 0.1 mm and flipped so Y points up. Threads with nothing to sew are
    /// skipped; a color change separates consecutive sewn threads. After the
    /// start, a trim or a color change, the frame jumps to the next stitch
    /// and sews it in place. Non-finite stitches are dropped with a warning.
    ///
    /// Positions are clamped to ±[`MAX_EXTENT`]; [`DstWriter::encode`]
    /// rejects patterns that would need clamping.
    pub fn records(&self, pattern: &Pattern) -> Vec<Record> {
        let center = pattern
            .bounds()
            .map(|b| b.center())
            .unwrap_or_default();
        let limit = f64::from(MAX_EXTENT);
        let to_units = |p: Point| -> (i32, i32) {
            let x = ((p.x - center.x) * UNITS_PER_MM).round();
            let y = (-(p.y - center.y) * UNITS_PER_MM).round();
            (x.clamp(-limit, limit) as i32, y.clamp(-limit, limit) as i32)
        };

        let mut out = RecordBuilder {
            records: Vec::new(),
            x: 0,
            y: 0,
            travelling: true,
        };
        let mut first_thread = true;

        for thread in pattern.threads.iter().filter(|t| !t.is_empty()) {
            if !first_thread {
                out.color_change();
            }
            first_thread = false;

            for run in &thread.runs {
                match run {
                    Run::Sewing(stitches) => {
                        for stitch in stitches {
                            if !stitch.is_finite() {
                                warn!(x = stitch.x, y = stitch.y, "dropping non-finite stitch");
                                continue;
                            }
                            let (x, y) = to_units(stitch.point());
                            out.place(x, y, stitch.is_jump());
                        }
                    }
                    Run::Trim(_) => out.trim(),
                    Run::ColorChange => out.color_change(),
                }
            }
        }

        out.records.push(Record::new(0, 0, RecordKind::End));
        out.records
    }

    /// Encode a pattern to a complete DST buffer.
    pub fn encode(&self, pattern: &Pattern) -> PatternResult<Vec<u8>> {
        pattern.validate()?;
        if let Some(b) = pattern.bounds() {
            let half = (b.width().max(b.height()) * UNITS_PER_MM / 2.0).round();
            if half > f64::from(MAX_EXTENT) {
                return Err(PatternError::TooLarge {
                    width: b.width(),
                    height: b.height(),
                });
            }
        }

        let records = self.records(pattern);
        let mut buf = build_header(&self.label, &records);
        buf.reserve(records.len() * 3);
        for record in &records {
            buf.extend_from_slice(&record.encode());
        }

        debug!(
            records = records.len(),
            color_changes = count_kind(&records, RecordKind::ColorChange),
            bytes = buf.len(),
            "encoded DST"
        );
        Ok(buf)
    }
}

fn count_kind(records: &[Record], kind: RecordKind) -> usize {
    records.iter().filter(|r| r.kind == kind).count()
}

/// Build the 512-byte header for a record stream.
///
/// `ST` counts every record including the End record; extents and the
/// final position come from walking the deltas.
pub fn build_header(label: &str, records: &[Record]) -> Vec<u8> {
    let (mut x, mut y) = (0i32, 0i32);
    let (mut min_x, mut max_x, mut min_y, mut max_y) = (0i32, 0i32, 0i32, 0i32);
    for r in records {
        x += r.dx;
        y += r.dy;
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    let label: String = label
        .chars()
        .map(|c| if c.is_ascii_graphic() || c == ' ' { c } else { '_' })
        .take(16)
        .collect();

    let text = format!(
        "LA:{label:<16}\rST:{st:07}\rCO:{co:03}\r+X:{px:05}\r-X:{nx:05}\r+Y:{py:05}\r-Y:{ny:05}\rAX:{x:+06}\rAY:{y:+06}\rMX:+00000\rMY:+00000\rPD:******\r",
        st = records.len(),
        co = count_kind(records, RecordKind::ColorChange),
        px = max_x,
        nx = -min_x,
        py = max_y,
        ny = -min_y,
    );

    let mut header = Vec::with_capacity(HEADER_SIZE);
    header.extend_from_slice(text.as_bytes());
    header.push(EOF_MARKER);
    header.resize(HEADER_SIZE, b' ');
    header
}

// ============================================================================
// READER
// ============================================================================

/// Parsed header fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DstHeader {
    pub label: String,
    pub record_count: u32,
    pub color_changes: u32,
    pub max_x: i32,
    pub min_x: i32,
    pub max_y: i32,
    pub min_y: i32,
    pub end_x: i32,
    pub end_y: i32,
}

/// Counts of what a record stream does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DstStats {
    pub stitches: usize,
    pub jumps: usize,
    pub trims: usize,
    pub color_changes: usize,
}

/// Parse the header of a DST buffer.
pub fn read_header(buf: &[u8]) -> Result<DstHeader, DecodeError> {
    if buf.len() < HEADER_SIZE {
        return Err(DecodeError::Truncated { len: buf.len() });
    }

    let header = &buf[..HEADER_SIZE];
    let end = header
        .iter()
        .position(|&b| b == EOF_MARKER)
        .unwrap_or(HEADER_SIZE);
    let text = String::from_utf8_lossy(&header[..end]);

    let field = |key: &str| -> Result<String, DecodeError> {
        text.split('\r')
            .find_map(|f| f.strip_prefix(key).and_then(|v| v.strip_prefix(':')))
            .map(str::to_string)
            .ok_or_else(|| DecodeError::BadHeader(format!("missing {key}")))
    };
    let number = |key: &str| -> Result<i32, DecodeError> {
        let raw = field(key)?;
        raw.trim()
            .parse::<i32>()
            .map_err(|_| DecodeError::BadHeader(format!("{key} is not a number: {raw:?}")))
    };
    let count = |key: &str| -> Result<u32, DecodeError> {
        u32::try_from(number(key)?)
            .map_err(|_| DecodeError::BadHeader(format!("{key} is negative")))
    };

    Ok(DstHeader {
        label: field("LA")?.trim_end().to_string(),
        record_count: count("ST")?,
        color_changes: count("CO")?,
        max_x: number("+X")?,
        min_x: -number("-X")?,
        max_y: number("+Y")?,
        min_y: -number("-Y")?,
        end_x: number("AX")?,
        end_y: number("AY")?,
    })
}

/// Decode every record after the header, up to and including End.
pub fn decode_records(buf: &[u8]) -> Result<Vec<Record>, DecodeError> {
    if buf.len() < HEADER_SIZE {
        return Err(DecodeError::Truncated { len: buf.len() });
    }

    let mut records = Vec::with_capacity((buf.len() - HEADER_SIZE) / 3);
    for chunk in buf[HEADER_SIZE..].chunks_exact(3) {
        let record = decode_record([chunk[0], chunk[1], chunk[2]]);
        records.push(record);
        if record.kind == RecordKind::End {
            break;
        }
    }
    Ok(records)
}

/// Summarize a record stream, recognising the trim jump triple.
pub fn stats(records: &[Record]) -> DstStats {
    let mut stats = DstStats::default();
    let mut i = 0;
    while i < records.len() {
        let is_trim = records.len() - i >= 3
            && records[i..i + 3]
                .iter()
                .zip(TRIM_JUMPS)
                .all(|(r, (dx, dy))| r.kind == RecordKind::Jump && r.dx == dx && r.dy == dy);
        if is_trim {
            stats.trims += 1;
            i += 3;
            continue;
        }
        match records[i].kind {
            RecordKind::Stitch => stats.stitches += 1,
            RecordKind::Jump => stats.jumps += 1,
            RecordKind::ColorChange => stats.color_changes += 1,
            RecordKind::End => {}
        }
        i += 1;
    }
    stats
}

// ============================================================================
// TESTS
// ============================================================================
