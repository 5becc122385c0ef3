use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ridingmap_render::{
    merge_regions, point, simplify, Box2D, PathCommand, Shape, Tolerances, ViewTransform,
};
use std::sync::Arc;

/// A wavy closed ring with `n` vertices around (cx, cy).
fn ring(cx: f32, cy: f32, radius: f32, n: usize) -> Shape {
    let mut commands = Vec::with_capacity(n + 1);
    for i in 0..n {
        let t = i as f32 / n as f32 * std::f32::consts::TAU;
        let r = radius * (1.0 + 0.05 * (t * 17.0).sin());
        let p = [cx + r * t.cos(), cy + r * t.sin()];
        commands.push(if i == 0 {
            PathCommand::MoveTo(p)
        } else {
            PathCommand::LineTo(p)
        });
    }
    commands.push(PathCommand::Close);
    Shape::from_commands(&commands).expect("valid ring")
}

fn bench_simplify(c: &mut Criterion) {
    let shape = ring(0.0, 0.0, 1000.0, 20_000);
    let focus = Box2D::new(point(-1000.0, -1000.0), point(1000.0, 1000.0));
    let fitted = ViewTransform::fit(&focus, 800, 800, 2.0).expect("fit");
    let zoomed_focus = Box2D::new(point(900.0, -50.0), point(1000.0, 50.0));
    let zoomed = ViewTransform::fit(&zoomed_focus, 800, 800, 2.0).expect("fit");

    c.bench_function("simplify_fitted_ring", |b| {
        b.iter(|| simplify(black_box(&shape), &fitted, Tolerances::default()))
    });
    c.bench_function("simplify_mostly_offscreen_ring", |b| {
        b.iter(|| simplify(black_box(&shape), &zoomed, Tolerances::default()))
    });
}

fn bench_merge(c: &mut Criterion) {
    let focus = Box2D::new(point(0.0, 0.0), point(400.0, 400.0));
    let view = ViewTransform::fit(&focus, 800, 800, 2.0).expect("fit");
    let members: Vec<_> = (0..16)
        .map(|i| {
            let cx = 50.0 + (i % 4) as f32 * 90.0;
            let cy = 50.0 + (i / 4) as f32 * 90.0;
            Arc::new(simplify(&ring(cx, cy, 55.0, 400), &view, Tolerances::default()))
        })
        .collect();

    c.bench_function("merge_16_rings", |b| {
        b.iter(|| merge_regions(black_box(&members), 0.25))
    });
}

criterion_group!(benches, bench_simplify, bench_merge);
criterion_main!(benches);
