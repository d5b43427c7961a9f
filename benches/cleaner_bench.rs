use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use inspection_cleaner::prelude::*;
use std::io::Cursor;

fn sample_line(i: usize) -> String {
    let mut fields = vec![String::new(); INPUT_COLUMNS.len()];
    fields[0] = format!("{}", 40_000_000 + i);
    fields[1] = format!("Joe's \"Diner\" #{}, Inc.", i);
    fields[2] = ["Manhattan", "Brooklyn", "Queens", "Bronx"][i % 4].to_string();
    fields[5] = "10001".to_string();
    fields[6] = " 2125551234 ".to_string();
    fields[7] = "American".to_string();
    fields[8] = format!("{:02}/15/2019", i % 12 + 1);
    fields[10] = "04L".to_string();
    fields[13] = format!("{}.5", i % 40);
    fields
        .iter()
        .map(|f| escape_field(f).into_owned())
        .collect::<Vec<_>>()
        .join(",")
}

fn bench_process(c: &mut Criterion) {
    let cleaner = RecordCleaner::new();
    let line = sample_line(7);

    c.bench_function("process_single_line", |b| {
        b.iter(|| cleaner.process(black_box(&line)))
    });
}

fn bench_engine(c: &mut Criterion) {
    let input: String = (0..10_000).map(|i| sample_line(i) + "\n").collect();

    let mut group = c.benchmark_group("engine");
    group.throughput(Throughput::Elements(10_000));

    for parallel in [false, true] {
        let name = if parallel { "parallel" } else { "sequential" };
        group.bench_function(name, |b| {
            b.iter(|| {
                let engine = CleaningEngine::new(RecordCleaner::new());
                let options = ExecutionOptions::new().with_parallel(parallel);
                engine
                    .run(Cursor::new(input.as_bytes()), std::io::sink(), Some(options))
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_process, bench_engine);
criterion_main!(benches);
