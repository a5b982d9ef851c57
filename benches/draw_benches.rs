use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use flipbook::{
    core::{
        config::Config,
        editor::{BrushColor, Editor},
    },
    vis::preview::compose_preview,
};

const BRUSH_SIZES: [usize; 3] = [1, 2, 4];

fn run_benches(c: &mut Criterion) {
    let mut group = c.benchmark_group("Drawing");
    line_benches(&mut group);
    preview_benches(&mut group);
    group.finish();
}

fn line_benches(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    for brush_size in BRUSH_SIZES.iter() {
        let mut editor = setup_editor(*brush_size);
        group.bench_function(BenchmarkId::new("diagonal_line", brush_size), |b| {
            b.iter(|| editor.draw_line(0.0, 0.0, 511.0, 383.0));
        });
    }
}

fn preview_benches(group: &mut criterion::BenchmarkGroup<criterion::measurement::WallTime>) {
    let mut editor = setup_editor(2);
    editor.select_color(BrushColor::Red);
    editor.draw_line(0.0, 383.0, 511.0, 0.0);
    editor.select_frame(1).unwrap();
    editor.draw_line(0.0, 0.0, 511.0, 383.0);

    group.bench_function(BenchmarkId::new("compose_preview", "onion_skin"), |b| {
        b.iter(|| compose_preview(&editor, None).unwrap());
    });
}

fn setup_editor(brush_size: usize) -> Editor {
    let config = Config::default();
    let mut editor = Editor::new(&config.canvas, &config.brush).unwrap();
    editor.set_brush_size(brush_size).unwrap();
    editor
}

criterion_group! {name = benches;
config = Criterion::default().measurement_time(Duration::from_secs(10)).sample_size(50);
targets=run_benches}
criterion_main!(benches);
