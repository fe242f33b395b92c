//! Benchmarks for event dispatch.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use saavy_organ::{
    engine::recording::RecordingEngine,
    io::midi::MidiEvent,
    synth::{DispatchSettings, Dispatcher, SynthMessage},
};

fn dispatcher() -> Dispatcher<RecordingEngine> {
    Dispatcher::new(RecordingEngine::new(), DispatchSettings::default())
}

pub fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/dispatch");

    // === PARSE ===
    // raw bytes from the device callback to a typed event
    group.bench_function("parse_note_on", |b| {
        b.iter(|| MidiEvent::from_bytes(black_box(&[0x90, 60, 100])))
    });

    // === KEY PRESS AND RELEASE ===
    // one voice started and released, the common case
    group.bench_function("note_on_off", |b| {
        let mut d = dispatcher();
        b.iter(|| {
            d.handle_message(black_box(SynthMessage::NoteOn {
                note: 60,
                velocity: 100,
            }))
            .ok();
            d.handle_message(black_box(SynthMessage::NoteOff { note: 60 }))
                .ok();
            d.engine_mut().take_commands();
        })
    });

    // === BEND SWEEP ===
    // one wheel movement with N held notes; cost scales with the chord
    for &held in &[1usize, 4, 10, 32] {
        let mut d = dispatcher();
        for note in 0..held as u8 {
            d.handle_message(SynthMessage::NoteOn {
                note: 36 + note,
                velocity: 90,
            })
            .ok();
        }
        d.engine_mut().take_commands();

        group.bench_with_input(BenchmarkId::new("bend", held), &held, |b, _| {
            let mut payload = 0u8;
            b.iter(|| {
                payload = (payload + 1) % 128;
                d.handle_message(black_box(SynthMessage::PitchBend { payload }))
                    .ok();
                d.engine_mut().take_commands();
            })
        });
    }

    // === PANIC ===
    // all notes off with a full keyboard held down
    group.bench_function("all_notes_off_full", |b| {
        let mut d = dispatcher();
        b.iter(|| {
            for note in 0..127u8 {
                d.handle_message(SynthMessage::NoteOn { note, velocity: 64 })
                    .ok();
            }
            d.handle_message(black_box(SynthMessage::AllNotesOff)).ok();
            d.engine_mut().take_commands();
        })
    });

    group.finish();
}
