use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fixcore::definitions::{self, fix44};
use fixcore::storage::Bytes;
use fixcore::tagvalue::Encoder;
use fixcore::MessageStorage;
use fixcore_dictionary::{Tag, Version};

fn t(n: u32) -> Tag {
    Tag::new(n).unwrap()
}

fn build_new_order_single() -> (MessageStorage<'static>, MessageStorage<'static>) {
    let mut header = MessageStorage::new(definitions::header::HeaderV44::info());
    header.set_raw(t(35), Bytes::Owned(b"D".to_vec())).unwrap();
    header.set_raw(t(34), Bytes::Owned(b"215".to_vec())).unwrap();
    header.set_raw(t(49), Bytes::Owned(b"CLIENT12".to_vec())).unwrap();
    header
        .set_raw(t(52), Bytes::Owned(b"20100225-19:41:57.316".to_vec()))
        .unwrap();
    header.set_raw(t(56), Bytes::Owned(b"B".to_vec())).unwrap();

    let mut body = MessageStorage::new(fix44::NewOrderSingle::info());
    body.set::<&str>(t(11), "13346").unwrap();
    body.set::<char>(t(21), '1').unwrap();
    body.set::<&str>(t(55), "GME").unwrap();
    body.set::<char>(t(54), '1').unwrap();
    body.set::<fixcore::types::UtcTimestamp>(
        t(60),
        fixcore::types::UtcTimestamp(
            chrono::NaiveDateTime::parse_from_str("20100225-19:39:52.020", "%Y%m%d-%H:%M:%S%.f")
                .unwrap(),
        ),
    )
    .unwrap();
    body.set::<rust_decimal::Decimal>(t(38), "100".parse().unwrap())
        .unwrap();
    body.set::<char>(t(40), '2').unwrap();
    body.set::<rust_decimal::Decimal>(t(44), "5".parse().unwrap())
        .unwrap();
    body.set::<char>(t(59), '0').unwrap();

    (header, body)
}

fn encode_fix_message(encoder: &Encoder, header: &MessageStorage, body: &MessageStorage) {
    let _ = encoder.write(black_box(Version::Fix44), black_box(header), black_box(body));
}

fn fix_encode_benchmark(c: &mut Criterion) {
    let encoder = Encoder::new();
    let (header, body) = build_new_order_single();

    c.bench_function("FIX encode NewOrderSingle", |b| {
        b.iter(|| encode_fix_message(&encoder, &header, &body))
    });
}

criterion_group!(benches, fix_encode_benchmark);
criterion_main!(benches);
