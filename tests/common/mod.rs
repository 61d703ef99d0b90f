//! Shared fixture writer for integration tests.
//!
//! Builds demo buffers in memory so tests do not depend on recordings
//! checked into the repository.

#![allow(dead_code)]

/// Size of the fixed header.
pub const HEADER_SIZE: usize = 0x42C;

const NAME_FIELD_SIZE: usize = 260;

/// A property value as written on the wire.
#[derive(Debug, Clone)]
pub enum Wire {
    Int(i32),
    Float(f32),
    Str(&'static str),
    Bool(bool),
    Vec3(f32, f32, f32),
    /// Raw tag and payload, for corrupt-value tests.
    Raw(u8, Vec<u8>),
}

/// A property key as written on the wire.
#[derive(Debug, Clone)]
pub enum Key {
    Name(&'static str),
    Interned(u16),
}

/// Builder for one packet frame.
#[derive(Debug, Default)]
pub struct FrameBuilder {
    bytes: Vec<u8>,
}

impl FrameBuilder {
    pub fn baseline(mut self, entity: u32, class: &str, props: &[(&'static str, Wire)]) -> Self {
        self.bytes.push(0x01);
        self.bytes.extend_from_slice(&entity.to_le_bytes());
        put_string(&mut self.bytes, class);
        put_properties(&mut self.bytes, props.iter().map(|(n, v)| (Key::Name(*n), v)));
        self
    }

    pub fn baseline_keys(mut self, entity: u32, class: &str, props: &[(Key, Wire)]) -> Self {
        self.bytes.push(0x01);
        self.bytes.extend_from_slice(&entity.to_le_bytes());
        put_string(&mut self.bytes, class);
        put_properties(&mut self.bytes, props.iter().map(|(k, v)| (k.clone(), v)));
        self
    }

    pub fn delta(mut self, entity: u32, props: &[(&'static str, Wire)]) -> Self {
        self.bytes.push(0x02);
        self.bytes.extend_from_slice(&entity.to_le_bytes());
        put_properties(&mut self.bytes, props.iter().map(|(n, v)| (Key::Name(*n), v)));
        self
    }

    pub fn remove(mut self, entity: u32) -> Self {
        self.bytes.push(0x03);
        self.bytes.extend_from_slice(&entity.to_le_bytes());
        self
    }

    pub fn string_table(mut self, table: &str, entries: &[(u16, &str)]) -> Self {
        self.bytes.push(0x04);
        put_string(&mut self.bytes, table);
        put_u16(&mut self.bytes, entries.len());
        for (index, text) in entries {
            self.bytes.extend_from_slice(&index.to_le_bytes());
            put_string(&mut self.bytes, text);
        }
        self
    }

    pub fn user_command(mut self, sequence: u32, data: &[u8]) -> Self {
        self.bytes.push(0x05);
        self.bytes.extend_from_slice(&sequence.to_le_bytes());
        put_u16(&mut self.bytes, data.len());
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn other(mut self, kind: u8, payload: &[u8]) -> Self {
        assert!(kind >= 0x80, "only length-prefixed kinds can be skipped");
        self.bytes.push(kind);
        let len = u32::try_from(payload.len()).unwrap();
        self.bytes.extend_from_slice(&len.to_le_bytes());
        self.bytes.extend_from_slice(payload);
        self
    }

    /// Appends raw bytes to the message stream.
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }
}

/// Builder for a whole demo buffer.
#[derive(Debug)]
pub struct DemoBuilder {
    protocol: u32,
    map: String,
    playback_time: f32,
    tick_count: u32,
    frames: Vec<u8>,
    frame_count: u32,
    stopped: bool,
}

impl Default for DemoBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoBuilder {
    pub fn new() -> Self {
        Self {
            protocol: 3,
            map: "cp_badlands".to_owned(),
            playback_time: 0.0,
            tick_count: 0,
            frames: Vec::new(),
            frame_count: 0,
            stopped: false,
        }
    }

    pub fn protocol(mut self, protocol: u32) -> Self {
        self.protocol = protocol;
        self
    }

    pub fn map(mut self, map: &str) -> Self {
        self.map = map.to_owned();
        self
    }

    pub fn timing(mut self, playback_time: f32, tick_count: u32) -> Self {
        self.playback_time = playback_time;
        self.tick_count = tick_count;
        self
    }

    /// Appends a packet frame built by `build`.
    pub fn frame(mut self, tick: u32, build: impl FnOnce(FrameBuilder) -> FrameBuilder) -> Self {
        self.frames.push(0x02);
        self.frames.extend_from_slice(&tick.to_le_bytes());
        let body = build(FrameBuilder::default());
        self.frames.extend_from_slice(&body.bytes);
        self.frames.push(0x00);
        self.frame_count += 1;
        self
    }

    /// Appends the stop command.
    pub fn stop(mut self) -> Self {
        self.frames.push(0x07);
        self.stopped = true;
        self
    }

    /// Returns the header bytes alone.
    pub fn header_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; HEADER_SIZE];
        out[0..8].copy_from_slice(b"HL2DEMO\0");
        out[0x008..0x00C].copy_from_slice(&self.protocol.to_le_bytes());
        out[0x00C..0x010].copy_from_slice(&24u32.to_le_bytes());
        put_name(&mut out, 0x010, "demoreel test server");
        put_name(&mut out, 0x114, "SourceTV");
        put_name(&mut out, 0x218, &self.map);
        put_name(&mut out, 0x31C, "tf");
        out[0x420..0x424].copy_from_slice(&self.playback_time.to_le_bytes());
        out[0x424..0x428].copy_from_slice(&self.tick_count.to_le_bytes());
        out[0x428..0x42C].copy_from_slice(&self.frame_count.to_le_bytes());
        out
    }

    /// Returns the complete buffer. Does not append a stop command.
    pub fn build(&self) -> Vec<u8> {
        let mut out = self.header_bytes();
        out.extend_from_slice(&self.frames);
        out
    }

    /// Returns the buffer terminated by a stop command.
    pub fn finish(self) -> Vec<u8> {
        if self.stopped {
            self.build()
        } else {
            self.stop().build()
        }
    }
}

fn put_name(out: &mut [u8], offset: usize, name: &str) {
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_FIELD_SIZE - 1);
    out[offset..offset + len].copy_from_slice(&bytes[..len]);
}

fn put_u16(out: &mut Vec<u8>, value: usize) {
    let value = u16::try_from(value).unwrap();
    out.extend_from_slice(&value.to_le_bytes());
}

fn put_string(out: &mut Vec<u8>, s: &str) {
    put_u16(out, s.len());
    out.extend_from_slice(s.as_bytes());
}

fn put_properties<'w>(out: &mut Vec<u8>, props: impl ExactSizeIterator<Item = (Key, &'w Wire)>) {
    put_u16(out, props.len());
    for (key, value) in props {
        match key {
            Key::Name(name) => {
                out.push(0x00);
                put_string(out, name);
            }
            Key::Interned(index) => {
                out.push(0x01);
                out.extend_from_slice(&index.to_le_bytes());
            }
        }
        put_value(out, value);
    }
}

fn put_value(out: &mut Vec<u8>, value: &Wire) {
    match value {
        Wire::Int(v) => {
            out.push(0x00);
            out.extend_from_slice(&v.to_le_bytes());
        }
        Wire::Float(v) => {
            out.push(0x01);
            out.extend_from_slice(&v.to_le_bytes());
        }
        Wire::Str(s) => {
            out.push(0x02);
            put_string(out, s);
        }
        Wire::Bool(b) => {
            out.push(0x03);
            out.push(u8::from(*b));
        }
        Wire::Vec3(x, y, z) => {
            out.push(0x04);
            for c in [x, y, z] {
                out.extend_from_slice(&c.to_le_bytes());
            }
        }
        Wire::Raw(tag, payload) => {
            out.push(*tag);
            out.extend_from_slice(payload);
        }
    }
}

/// A small match: two players and a sentry over five ticks.
///
/// | Tick | Event |
/// |------|-------|
/// | 100 | names table, players 1 and 2 spawn, roster |
/// | 101 | player 1 loses health |
/// | 102 | sentry 9 spawns |
/// | 103 | player 2 dies |
/// | 104 | player 2 removed, user command |
pub fn sample_match() -> Vec<u8> {
    DemoBuilder::new()
        .timing(0.075, 5)
        .frame(100, |f| {
            f.string_table("propnames", &[(0, "health"), (1, "class")])
                .string_table("userinfo", &[(0, "alice"), (1, "bob")])
                .baseline_keys(
                    1,
                    "players",
                    &[
                        (Key::Interned(0), Wire::Int(125)),
                        (Key::Interned(1), Wire::Str("scout")),
                        (Key::Name("alive"), Wire::Bool(true)),
                        (Key::Name("position"), Wire::Vec3(1.0, 2.0, 3.0)),
                    ],
                )
                .baseline(
                    2,
                    "players",
                    &[
                        ("health", Wire::Int(300)),
                        ("class", Wire::Str("other")),
                        ("alive", Wire::Bool(true)),
                        ("position", Wire::Vec3(-4.0, 0.5, 0.0)),
                    ],
                )
        })
        .frame(101, |f| f.delta(1, &[("health", Wire::Int(80))]))
        .frame(102, |f| {
            f.baseline(
                9,
                "sentries",
                &[("health", Wire::Float(216.0)), ("level", Wire::Int(3))],
            )
            .other(0x90, &[0xAA; 12])
        })
        .frame(103, |f| {
            f.delta(2, &[("health", Wire::Int(0)), ("alive", Wire::Bool(false))])
        })
        .frame(104, |f| f.remove(2).user_command(1, &[1, 2, 3]))
        .finish()
}
