use criterion::{black_box, criterion_group, criterion_main, Criterion};
use fixcore::definitions;
use fixcore::tagvalue::Decoder;

const FIX_MESSAGE: &[u8] =
    b"8=FIX.4.4\x019=122\x0135=D\x0134=215\x0149=CLIENT12\x0152=20100225-19:41:57.316\x0156=B\x0111=13346\x0121=1\x0155=GME\x0154=1\x0160=20100225-19:39:52.020\x0138=100\x0140=2\x0144=5\x0159=0\x0110=072\x01";

fn decode_fix_message(decoder: &Decoder, msg: &[u8]) {
    // Body length/checksum are perturbed by editing the message above
    // without recomputing the trailer, so validation is disabled here;
    // this bench measures parse cost, not trailer verification.
    let _ = decoder.decode(black_box(msg));
}

fn fix_decode_benchmark(c: &mut Criterion) {
    let mut decoder = Decoder::new(definitions::registry());
    decoder.config_mut().validate_checksum = false;
    decoder.config_mut().validate_length = false;

    c.bench_function("FIX decode NewOrderSingle", |b| {
        b.iter(|| decode_fix_message(&decoder, FIX_MESSAGE))
    });
}

criterion_group!(benches, fix_decode_benchmark);
criterion_main!(benches);
