use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use ukeire::algo::Analyzer;
use ukeire::algo::shanten::shanten;
use ukeire::algo::waits::calc_shanten_and_waits13;
use ukeire::hand::hand;
use ukeire::state::PlayerInfo;

const HANDS_13: [&str; 4] = [
    "11357m 13579p 135s",
    "3456m 3456s 44456p",
    "123456789m 1135s",
    "1122m 3344p 55s 567z",
];

fn bench_shanten(c: &mut Criterion) {
    let hands: Vec<_> = HANDS_13.iter().map(|s| hand(s).unwrap()).collect();
    c.bench_function("shanten", |b| {
        b.iter(|| {
            for h in &hands {
                black_box(shanten(black_box(h)));
            }
        });
    });
    c.bench_function("waits13", |b| {
        b.iter(|| {
            for h in &hands {
                black_box(calc_shanten_and_waits13(black_box(h), None));
            }
        });
    });
}

fn bench_analyze(c: &mut Criterion) {
    let analyzer = Analyzer::default();

    let mut player = PlayerInfo::from_hand_str("3456m 3456s 44456p").unwrap();
    c.bench_function("analyze13_one_shanten", |b| {
        b.iter(|| black_box(analyzer.analyze13(&mut player)));
    });

    let mut player = PlayerInfo::from_hand_str("11357m 13579p 135s 1z").unwrap();
    c.bench_function("analyze14_three_shanten", |b| {
        b.iter(|| black_box(analyzer.analyze14(&mut player)));
    });
    c.bench_function("analyze14_parallel_three_shanten", |b| {
        b.iter(|| black_box(analyzer.analyze14_parallel(&player)));
    });
}

criterion_group!(benches, bench_shanten, bench_analyze);
criterion_main!(benches);
