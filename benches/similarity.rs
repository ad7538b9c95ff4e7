// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::{criterion_group, criterion_main, Criterion};
use nalgebra::DMatrix;
use rand::{rngs::StdRng, Rng, SeedableRng};

use depth_eval::core::{box_filter, psnr, ssim};

fn random_image(rng: &mut StdRng, nb_rows: usize, nb_cols: usize) -> DMatrix<f64> {
    DMatrix::from_fn(nb_rows, nb_cols, |_, _| rng.gen::<f64>())
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(42);
    let a = random_image(&mut rng, 480, 640);
    let b = random_image(&mut rng, 480, 640);

    c.bench_function("local_means 11 480x640", |bench| {
        bench.iter(|| box_filter::compute_local_means(&a, 11))
    });
    c.bench_function("similarity 11 480x640", |bench| {
        bench.iter(|| ssim::similarity(&a, &b, 1.0, 11))
    });
    c.bench_function("psnr 480x640", |bench| bench.iter(|| psnr::psnr(&a, &b, 1.0)));
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
