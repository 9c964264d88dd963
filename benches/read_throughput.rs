use avrotable::reader::varint::encode_zigzag;
use avrotable::reader::AVRO_MAGIC;
use avrotable::{read_bytes, ReadOptions};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const SCHEMA: &str = r#"{
    "type": "record",
    "name": "Event",
    "fields": [
        {"name": "id", "type": "long"},
        {"name": "name", "type": "string"},
        {"name": "value", "type": "double"}
    ]
}"#;

const SYNC: [u8; 16] = [0x42; 16];
const ROWS_PER_BLOCK: usize = 1000;
const BLOCKS: usize = 20;

fn build_container() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&AVRO_MAGIC);
    out.extend(encode_zigzag(1));
    out.extend(encode_zigzag(11));
    out.extend_from_slice(b"avro.schema");
    out.extend(encode_zigzag(SCHEMA.len() as i64));
    out.extend_from_slice(SCHEMA.as_bytes());
    out.push(0x00);
    out.extend_from_slice(&SYNC);

    for block in 0..BLOCKS {
        let mut payload = Vec::new();
        for row in 0..ROWS_PER_BLOCK {
            let id = (block * ROWS_PER_BLOCK + row) as i64;
            payload.extend(encode_zigzag(id));
            let name = format!("event-{id}");
            payload.extend(encode_zigzag(name.len() as i64));
            payload.extend_from_slice(name.as_bytes());
            payload.extend_from_slice(&(id as f64).to_le_bytes());
        }
        out.extend(encode_zigzag(ROWS_PER_BLOCK as i64));
        out.extend(encode_zigzag(payload.len() as i64));
        out.extend_from_slice(&payload);
        out.extend_from_slice(&SYNC);
    }
    out
}

fn bench_read(c: &mut Criterion) {
    let container = build_container();

    let mut group = c.benchmark_group("read");
    group.throughput(Throughput::Bytes(container.len() as u64));

    group.bench_function("all_columns", |b| {
        b.iter(|| {
            let table =
                read_bytes(black_box(container.clone()), &ReadOptions::new()).unwrap();
            black_box(table.num_rows())
        })
    });

    group.bench_function("one_column_projected", |b| {
        let options = ReadOptions::new().column_names(["id"]);
        b.iter(|| {
            let table = read_bytes(black_box(container.clone()), &options).unwrap();
            black_box(table.num_rows())
        })
    });

    group.bench_function("first_100_rows", |b| {
        let options = ReadOptions::new().n_rows(100);
        b.iter(|| {
            let table = read_bytes(black_box(container.clone()), &options).unwrap();
            black_box(table.num_rows())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_read);
criterion_main!(benches);
