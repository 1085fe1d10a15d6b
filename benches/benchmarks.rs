//! Benchmarks for the pagination engine

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use screenplay_pager::{page_views, CancellationToken, Line, LineType, Paginator};

/// A feature-length script: scenes of action and alternating dialogue
fn script(scenes: usize) -> Vec<Line> {
    let mut lines = Vec::new();
    for scene in 0..scenes {
        lines.push(Line::new(LineType::Heading, format!("INT. LOCATION {scene} - DAY")));
        lines.push(Line::new(LineType::Empty, ""));
        lines.push(Line::new(
            LineType::Action,
            "The room is quiet. Rain taps the window while a clock ticks somewhere \
             behind the bookshelf, slow and deliberate.",
        ));
        lines.push(Line::new(LineType::Empty, ""));
        for exchange in 0..4 {
            let name = if exchange % 2 == 0 { "BOB" } else { "ALICE" };
            lines.push(Line::new(LineType::Character, name));
            lines.push(Line::new(
                LineType::Dialogue,
                "I keep telling you the same thing. You never listen. \
                 One day you will wish you had, and it will be too late for both of us.",
            ));
            lines.push(Line::new(LineType::Empty, ""));
        }
    }
    lines
}

fn bench_paginate_short(c: &mut Criterion) {
    let lines = script(5);
    let paginator = Paginator::default();
    c.bench_function("paginate_short_script", |b| {
        b.iter(|| black_box(paginator.paginate(black_box(&lines))));
    });
}

fn bench_paginate_feature(c: &mut Criterion) {
    let lines = script(120);
    let paginator = Paginator::default();
    c.bench_function("paginate_feature_script", |b| {
        b.iter(|| black_box(paginator.paginate(black_box(&lines))));
    });
}

fn bench_live_edit_near_end(c: &mut Criterion) {
    let mut lines = script(120);
    let paginator = Paginator::default();
    let previous = paginator.paginate(&lines);
    let edited = lines.len() - 10;
    lines[edited] = Line::new(LineType::Dialogue, "Fine.");

    c.bench_function("live_edit_near_end", |b| {
        b.iter(|| {
            black_box(paginator.paginate_from(
                black_box(&lines),
                edited,
                &previous,
                &CancellationToken::new(),
            ))
        });
    });
}

fn bench_page_views(c: &mut Criterion) {
    let lines = script(120);
    let paginator = Paginator::default();
    let pagination = paginator.paginate(&lines);
    c.bench_function("build_page_views", |b| {
        b.iter(|| black_box(page_views(&pagination, paginator.styles())));
    });
}

criterion_group!(
    benches,
    bench_paginate_short,
    bench_paginate_feature,
    bench_live_edit_near_end,
    bench_page_views,
);

criterion_main!(benches);
