//! In-memory Standard MIDI File writer for loader tests.

#![allow(dead_code)]

/// One MTrk chunk. Events are added at absolute ticks in non-decreasing order.
#[derive(Debug, Default)]
pub struct TrackBuilder {
    data: Vec<u8>,
    last_tick: u32,
}

impl TrackBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tempo(mut self, tick: u32, micros_per_beat: u32) -> Self {
        self.delta(tick);
        let [_, b1, b2, b3] = micros_per_beat.to_be_bytes();
        self.data.extend_from_slice(&[0xFF, 0x51, 0x03, b1, b2, b3]);
        self
    }

    pub fn note_on(mut self, tick: u32, key: u8, velocity: u8) -> Self {
        self.delta(tick);
        self.data.extend_from_slice(&[0x90, key, velocity]);
        self
    }

    pub fn note_off(mut self, tick: u32, key: u8) -> Self {
        self.delta(tick);
        self.data.extend_from_slice(&[0x80, key, 0x40]);
        self
    }

    /// Note-on followed by its note-off 10 ticks later.
    pub fn hit(self, tick: u32, key: u8) -> Self {
        self.note_on(tick, key, 100).note_off(tick + 10, key)
    }

    pub fn program_change(mut self, tick: u32, program: u8) -> Self {
        self.delta(tick);
        self.data.extend_from_slice(&[0xC0, program]);
        self
    }

    fn delta(&mut self, tick: u32) {
        assert!(tick >= self.last_tick, "events must be added in tick order");
        write_vlq(&mut self.data, tick - self.last_tick);
        self.last_tick = tick;
    }

    fn finish(mut self) -> Vec<u8> {
        let tick = self.last_tick;
        self.delta(tick);
        self.data.extend_from_slice(&[0xFF, 0x2F, 0x00]);
        self.data
    }
}

/// Whole-file writer (format 0 for one track, format 1 otherwise).
#[derive(Debug)]
pub struct SmfBuilder {
    division: u16,
    tracks: Vec<TrackBuilder>,
}

impl SmfBuilder {
    pub fn metrical(ticks_per_beat: u16) -> Self {
        Self {
            division: ticks_per_beat & 0x7FFF,
            tracks: Vec::new(),
        }
    }

    pub fn timecode(frames_per_second: u8, ticks_per_frame: u8) -> Self {
        let fps = (-(frames_per_second as i8)) as u8;
        Self {
            division: (u16::from(fps) << 8) | u16::from(ticks_per_frame),
            tracks: Vec::new(),
        }
    }

    pub fn track(mut self, track: TrackBuilder) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        let format: u16 = if self.tracks.len() == 1 { 0 } else { 1 };

        out.extend_from_slice(b"MThd");
        out.extend_from_slice(&6u32.to_be_bytes());
        out.extend_from_slice(&format.to_be_bytes());
        out.extend_from_slice(&(self.tracks.len() as u16).to_be_bytes());
        out.extend_from_slice(&self.division.to_be_bytes());

        for track in self.tracks {
            let data = track.finish();
            out.extend_from_slice(b"MTrk");
            out.extend_from_slice(&(data.len() as u32).to_be_bytes());
            out.extend_from_slice(&data);
        }
        out
    }
}

fn write_vlq(out: &mut Vec<u8>, mut value: u32) {
    let mut buf = [0u8; 4];
    let mut i = buf.len() - 1;
    buf[i] = (value & 0x7F) as u8;
    value >>= 7;
    while value > 0 {
        i -= 1;
        buf[i] = ((value & 0x7F) as u8) | 0x80;
        value >>= 7;
    }
    out.extend_from_slice(&buf[i..]);
}
