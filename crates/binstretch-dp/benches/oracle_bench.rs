// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use binstretch_dp::FeasibilityOracle;
use binstretch_model::{BinConf, Problem, SolverConfig, TransTable, Zobrist};
use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

fn mid_game_conf() -> BinConf {
    let problem = Problem::new(14, 19, 3).expect("valid problem");
    let zobrist = Arc::new(Zobrist::new(&problem));
    let mut conf = BinConf::new(&problem, zobrist);
    for size in [9, 7, 6, 5, 4, 4, 3] {
        conf.add_item(size);
    }
    conf
}

fn bench_feasibility_test(c: &mut Criterion) {
    let conf = mid_game_conf();
    let cache = Arc::new(TransTable::new(&SolverConfig::default()));
    let mut oracle = FeasibilityOracle::new(cache);

    c.bench_function("sparse feasibility test, 7 items on 3 bins", |b| {
        b.iter(|| {
            assert!(oracle.is_feasible(std::hint::black_box(&conf)));
        })
    });
}

fn bench_max_feasible_cold_cache(c: &mut Criterion) {
    let mut conf = mid_game_conf();

    c.bench_function("max feasible item, cold cache", |b| {
        b.iter(|| {
            let cache = Arc::new(TransTable::new(
                &SolverConfig::default().with_hash_bits(14),
            ));
            let mut oracle = FeasibilityOracle::new(cache);
            std::hint::black_box(oracle.max_feasible_item(&mut conf));
        })
    });
}

criterion_group!(benches, bench_feasibility_test, bench_max_feasible_cold_cache);
criterion_main!(benches);
