#![no_main]

use std::collections::HashSet;
use std::sync::Arc;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use notefall_chart::{Chart, LANE_COUNT, Note};
use notefall_play::{InputEvent, PlaySession, TickInput};

#[derive(Debug, Arbitrary)]
struct Tick {
    /// Clock step in milliseconds
    step_ms: u8,
    speed_tenths: u8,
    presses: Vec<(u8, i16)>,
}

#[derive(Debug, Arbitrary)]
struct Input {
    notes: Vec<(u8, u16)>,
    health: u8,
    ticks: Vec<Tick>,
}

fuzz_target!(|input: Input| {
    let notes: Vec<Note> = input
        .notes
        .iter()
        .map(|&(lane, ms)| Note::new(lane as usize % LANE_COUNT, f64::from(ms) / 1000.0))
        .collect();
    let Ok(chart) = Chart::from_notes(notes) else {
        return;
    };
    let mut session = PlaySession::start(Arc::new(chart), i32::from(input.health));

    let mut judged = HashSet::new();
    let mut clock = 0.0;
    for tick in &input.ticks {
        clock += f64::from(tick.step_ms) / 1000.0;
        let presses: Vec<InputEvent> = tick
            .presses
            .iter()
            .map(|&(lane, err)| InputEvent::new(lane as usize % LANE_COUNT, clock + f64::from(err) / 1000.0))
            .collect();
        let speed = f64::from(tick.speed_tenths.max(1)) / 10.0;

        let out = session.tick(&TickInput::new(clock, 0.0, speed).with_inputs(&presses));
        assert!(out.progress.max_combo >= out.progress.combo);
        for event in &out.judgments {
            assert!(judged.insert(event.note_index));
        }
    }
});
