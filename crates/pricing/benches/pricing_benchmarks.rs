use criterion::{black_box, criterion_group, criterion_main, Criterion};

use stackassign_pricing::{compute_price, quote_tiers, AcademicLevel};

fn bench_compute_price(c: &mut Criterion) {
    c.bench_function("compute_price/bachelor_7d_10p", |b| {
        b.iter(|| {
            compute_price(
                black_box(AcademicLevel::Bachelor),
                black_box(7),
                black_box(10),
            )
            .unwrap()
        })
    });

    c.bench_function("compute_price/all_levels_sweep", |b| {
        b.iter(|| {
            for level in AcademicLevel::ALL {
                for days in [-1i64, 0, 2, 3, 7, 14, 30] {
                    let _ = compute_price(black_box(level), black_box(days), black_box(25));
                }
            }
        })
    });
}

fn bench_quote_tiers(c: &mut Criterion) {
    c.bench_function("quote_tiers/phd_12p", |b| {
        b.iter(|| quote_tiers(black_box(AcademicLevel::Phd), black_box(12)).unwrap())
    });
}

criterion_group!(benches, bench_compute_price, bench_quote_tiers);
criterion_main!(benches);
