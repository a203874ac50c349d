//! Synthetic SOR files for the integration tests.
#![allow(dead_code)]

use sor_rs::blocks::crc16_ccitt;

pub fn assert_close(actual: f64, expected: f64) {
    let tolerance = 1e-9 * expected.abs().max(1.0);
    assert!(
        (actual - expected).abs() <= tolerance,
        "expected {expected}, got {actual}"
    );
}

/// Little-endian block body writer.
#[derive(Debug, Default, Clone)]
pub struct Body(Vec<u8>);

impl Body {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u16(mut self, value: u16) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i16(mut self, value: i16) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn u32(mut self, value: u32) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    pub fn i32(mut self, value: i32) -> Self {
        self.0.extend_from_slice(&value.to_le_bytes());
        self
    }

    /// Fixed-width text, no terminator.
    pub fn text(mut self, value: &str) -> Self {
        self.0.extend_from_slice(value.as_bytes());
        self
    }

    /// NUL-terminated text.
    pub fn cstr(mut self, value: &str) -> Self {
        self.0.extend_from_slice(value.as_bytes());
        self.0.push(0);
        self
    }

    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.0.extend_from_slice(value);
        self
    }

    pub fn build(self) -> Vec<u8> {
        self.0
    }
}

/// Assembles a Map block, the listed blocks and an optional checksum.
#[derive(Debug, Clone)]
pub struct SorBuilder {
    version: u16,
    blocks: Vec<(String, Vec<u8>)>,
    checksum: bool,
    map_padding: usize,
}

impl SorBuilder {
    /// Revision 2.00 file.
    pub fn new() -> Self {
        Self {
            version: 200,
            blocks: Vec::new(),
            checksum: false,
            map_padding: 0,
        }
    }

    /// Revision 1.00 file.
    pub fn revision1() -> Self {
        Self {
            version: 100,
            ..Self::new()
        }
    }

    pub fn rev2(&self) -> bool {
        self.version >= 200
    }

    /// Add a block; revision 2 files get the name header prepended.
    pub fn block(mut self, name: &str, body: Vec<u8>) -> Self {
        let mut bytes = Vec::new();
        if self.rev2() {
            bytes.extend_from_slice(name.as_bytes());
            bytes.push(0);
        }
        bytes.extend_from_slice(&body);
        self.blocks.push((name.to_string(), bytes));
        self
    }

    /// Add a block exactly as given.
    pub fn raw_block(mut self, name: &str, bytes: Vec<u8>) -> Self {
        self.blocks.push((name.to_string(), bytes));
        self
    }

    /// Append a Cksum block holding a correct CRC.
    pub fn with_checksum(mut self) -> Self {
        self.checksum = true;
        self
    }

    /// Extra zero bytes at the end of the Map block, counted in its size.
    pub fn with_map_padding(mut self, len: usize) -> Self {
        self.map_padding = len;
        self
    }

    fn checksum_len(&self) -> usize {
        if self.rev2() { "Cksum".len() + 1 + 2 } else { 2 }
    }

    pub fn build(&self) -> Vec<u8> {
        let mut entries: Vec<(&str, usize)> = self
            .blocks
            .iter()
            .map(|(name, bytes)| (name.as_str(), bytes.len()))
            .collect();
        if self.checksum {
            entries.push(("Cksum", self.checksum_len()));
        }

        let mut map = Vec::new();
        if self.rev2() {
            map.extend_from_slice(b"Map\0");
        }
        map.extend_from_slice(&self.version.to_le_bytes());
        let size_at = map.len();
        map.extend_from_slice(&0u32.to_le_bytes());
        map.extend_from_slice(&(entries.len() as u16 + 1).to_le_bytes());
        for (name, len) in &entries {
            map.extend_from_slice(name.as_bytes());
            map.push(0);
            map.extend_from_slice(&self.version.to_le_bytes());
            map.extend_from_slice(&(*len as u32).to_le_bytes());
        }
        map.resize(map.len() + self.map_padding, 0);
        let map_len = map.len() as u32;
        map[size_at..size_at + 4].copy_from_slice(&map_len.to_le_bytes());

        let mut out = map;
        for (_, bytes) in &self.blocks {
            out.extend_from_slice(bytes);
        }
        if self.checksum {
            if self.rev2() {
                out.extend_from_slice(b"Cksum\0");
            }
            let crc = crc16_ccitt(&out);
            out.extend_from_slice(&crc.to_le_bytes());
        }
        out
    }
}

// ============================================================================
// Block bodies (without the revision 2 name header)
// ============================================================================

pub fn general_params(rev2: bool) -> Vec<u8> {
    let mut body = Body::new()
        .text("EN")
        .cstr("CABLE-01")
        .cstr("FIBER-007");
    if rev2 {
        body = body.u16(652);
    }
    body = body
        .u16(1550)
        .cstr("Central Office")
        .cstr("Hut 12")
        .cstr("SMF-28")
        .text("BC")
        .i32(1000);
    if rev2 {
        body = body.i32(20);
    }
    body.cstr("night shift").cstr("after repair").build()
}

pub fn supplier_params() -> Vec<u8> {
    Body::new()
        .cstr("Acme Photonics")
        .cstr("OTDR-9000")
        .cstr("SN1234")
        .cstr("M-1550")
        .cstr("MSN99")
        .cstr("4.2.1")
        .cstr("")
        .build()
}

/// Group index 1.468, 100 ns pulse, 0.5 ns per sample.
pub const INDEX_RAW: u32 = 146_800;
pub const SPACING_RAW: u32 = 50_000;

pub fn fixed_params(rev2: bool, points: u32) -> Vec<u8> {
    let mut body = Body::new()
        .u32(1_600_000_000)
        .text("mt")
        .u16(15_500)
        .i32(0);
    if rev2 {
        body = body.i32(0);
    }
    body = body
        .u16(1)
        .u16(100)
        .u32(SPACING_RAW)
        .u32(points)
        .u32(INDEX_RAW)
        .u16(800)
        .u32(1000);
    if rev2 {
        body = body.u16(300);
    }
    body = body.u32(250);
    if rev2 {
        body = body.i32(0);
    }
    body = body
        .i32(0)
        .u16(0)
        .i16(0)
        .u16(0)
        .u16(200)
        .u16(40_000)
        .u16(3000);
    if rev2 {
        body = body.text("ST").i32(0).i32(0).i32(1000).i32(-1000);
    }
    body.build()
}

/// One scale group.
pub fn data_points(scale_factor: u16, samples: &[u16]) -> Vec<u8> {
    let mut body = Body::new()
        .u32(samples.len() as u32)
        .u16(1)
        .u32(samples.len() as u32)
        .u16(scale_factor);
    for &sample in samples {
        body = body.u16(sample);
    }
    body.build()
}

/// Events as `(number, time of travel in 100 ps units, type code)`.
pub fn key_events(rev2: bool, events: &[(u16, u32, &str)]) -> Vec<u8> {
    let mut body = Body::new().u16(events.len() as u16);
    for &(number, time, code) in events {
        body = body
            .u16(number)
            .u32(time)
            .i16(200)
            .i16(150)
            .i32(-45_000)
            .text(code);
        if rev2 {
            body = body
                .u32(time.saturating_sub(10))
                .u32(time)
                .u32(time + 10)
                .u32(time + 20)
                .u32(time + 5);
        }
        body = body.cstr("");
    }
    let last = events.last().map_or(0, |&(_, time, _)| time);
    body = body.i32(3500).i32(0).u32(last);
    if rev2 {
        body = body.u16(32_000).i32(0).u32(last);
    }
    body.build()
}

/// Landmarks as `(number, location time in 100 ps units)`.
pub fn link_params(landmarks: &[(u16, i32)]) -> Vec<u8> {
    let mut body = Body::new().u16(landmarks.len() as u16);
    for &(number, location) in landmarks {
        body = body
            .u16(number)
            .text("MH")
            .i32(location)
            .u16(number)
            .i32(-73_985_000)
            .i32(40_748_000)
            .u16(100)
            .u32(1200)
            .u32(1300)
            .text("mt")
            .u16(92)
            .cstr("manhole");
    }
    body.build()
}

pub const SAMPLES: [u16; 5] = [100, 200, 300, 250, 150];

/// A file with every block type, a vendor block and a valid checksum.
pub fn full_file(rev2: bool) -> Vec<u8> {
    let builder = if rev2 {
        SorBuilder::new()
    } else {
        SorBuilder::revision1()
    };
    builder
        .block("GenParams", general_params(rev2))
        .block("SupParams", supplier_params())
        .block("FxdParams", fixed_params(rev2, SAMPLES.len() as u32))
        .block(
            "KeyEvents",
            key_events(rev2, &[(1, 0, "1F9999LS"), (2, 50_000, "0F9999LS"), (3, 100_000, "1E9999LS")]),
        )
        .block("DataPts", data_points(1000, &SAMPLES))
        .block("LnkParams", link_params(&[(1, 25_000)]))
        .block("AcmeVendor", vec![0xde, 0xad, 0xbe, 0xef])
        .with_checksum()
        .build()
}
