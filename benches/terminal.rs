//! Virtual terminal benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use termshot::parser::Decoder;
use termshot::terminal::interpret;

fn bench_interpret(c: &mut Criterion) {
    let mut group = c.benchmark_group("terminal");

    // Progress bar redraws, as produced by package managers
    let progress: String = (0..=100)
        .map(|i| format!("\r\x1b[K[{:<50}] {:>3}%", "#".repeat(i / 2), i))
        .collect();
    let chars = Decoder::new()
        .keep_cursor_sequences(true)
        .decode(progress.as_bytes());
    group.throughput(Throughput::Elements(chars.len() as u64));

    group.bench_function("progress_redraw", |b| {
        b.iter(|| black_box(interpret(black_box(&chars), 80)))
    });

    // Long lines that wrap
    let long = "abcdefghij".repeat(2000);
    let chars = Decoder::new().keep_cursor_sequences(true).decode(long.as_bytes());
    group.throughput(Throughput::Elements(chars.len() as u64));

    group.bench_function("wrapping", |b| {
        b.iter(|| black_box(interpret(black_box(&chars), 80)))
    });

    // Absolute positioning across a screen
    let positioned: String = (1..=24)
        .flat_map(|row| {
            (1..=8).map(move |col| format!("\x1b[{};{}H\x1b[7m*\x1b[0m", row, col * 10))
        })
        .collect();
    let chars = Decoder::new()
        .keep_cursor_sequences(true)
        .decode(positioned.as_bytes());
    group.throughput(Throughput::Elements(chars.len() as u64));

    group.bench_function("cursor_positioning", |b| {
        b.iter(|| black_box(interpret(black_box(&chars), 80)))
    });

    group.finish();
}

criterion_group!(benches, bench_interpret);
criterion_main!(benches);
