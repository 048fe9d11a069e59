use encrypted_counter::{utils, Counter, PrivateKey};
use rug::Integer;

/// Safe 1536 bit prime number in hex encoding
const P: &str = "e84f454a8dd9e923fc85be8ca09278e28c5a3d9419cf118ef56912910f364c5\
                 29d999dba2837e55d413827ccf97a4b6c49addd56f079032164d487fbd22d5e\
                 a9ff0c8fdc6bce1b878a7109f33061874f310ae35ac75db3ac3fd5f49d8b85b\
                 8823f05fc288602abf6a4ef641a3766a44d7ecbceebe3bf144a582639b55658\
                 e93cc57445715ce83c0e7088ec701ded2bcbd2e91a68cb26b1aaddadf99aeef\
                 927fb82459a3805c232e36162cbea024a2fe7485b96eeb278d45016c622261b\
                 3d3aa3";
/// Safe 1536 bit prime number in hex encoding
const Q: &str = "9461f6a273f4bdf08ce0b1071253e0688d622d6b714b407200fa709d964034c\
                 1b84b97057a8dd48904a99e83f1cb4c94d6927ac6424b8028eefe6503336e03\
                 1ff0d7379932b1f6fa457d8a1e4d9436c42df8ba86ad54cc83a708cd6385d4d\
                 5cbf0c62f9f692f04e500726d5d41224e2ec88d48bd3d04c004c9a8e6ce23ee\
                 fb54995d7b4473c021f8a72c06fe3ce6488e6b1b8ad51b635a853121f4285c0\
                 c364aab061aea672cb6dd86cee08b63a5b3f1fc78f1712e1a333b2552471e5a\
                 d8403f";

fn fixed_keypair() -> PrivateKey {
    let p = Integer::from_str_radix(P, 16).unwrap();
    let q = Integer::from_str_radix(Q, 16).unwrap();
    PrivateKey::from_primes(p, q).unwrap()
}

fn encryption(c: &mut criterion::Criterion) {
    let rng = rand_dev::DevRng::new();
    let sk = fixed_keypair();
    let pk = sk.public_key();

    let mut group = c.benchmark_group("Encrypt");

    group.bench_function("new_counter (encrypt 0)", |b| {
        let mut rng = rng.clone();
        b.iter(|| Counter::new_counter_with_rng(&mut rng, &pk).unwrap())
    });

    group.bench_function("encrypt_with_random via public key", |b| {
        let mut setup_rng = rng.clone();
        let mut routine_rng = rng.clone();
        b.iter_batched(
            || {
                pk.n()
                    .clone()
                    .random_below(&mut utils::external_rand(&mut setup_rng))
            },
            |x| pk.encrypt_with_random(&mut routine_rng, &x).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("encrypt_with_random via private key (known factorization)", |b| {
        let mut setup_rng = rng.clone();
        let mut routine_rng = rng.clone();
        b.iter_batched(
            || {
                pk.n()
                    .clone()
                    .random_below(&mut utils::external_rand(&mut setup_rng))
            },
            |x| sk.encrypt_with_random(&mut routine_rng, &x).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn decryption(c: &mut criterion::Criterion) {
    let rng = rand_dev::DevRng::new();
    let sk = fixed_keypair();
    let pk = sk.public_key();

    let mut group = c.benchmark_group("Decrypt");

    group.bench_function("CRT decrypt", |b| {
        let mut setup_rng = rng.clone();
        b.iter_batched(
            || {
                let mut counter = Counter::new_counter_with_rng(&mut setup_rng, &pk).unwrap();
                counter.inc_with_rng(&mut setup_rng, 42).unwrap();
                counter
            },
            |counter| counter.decrypt(&sk).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn homomorphic_ops(c: &mut criterion::Criterion) {
    let rng = rand_dev::DevRng::new();
    let sk = fixed_keypair();
    let pk = sk.public_key();

    let mut group = c.benchmark_group("Homomorphic ops");

    group.bench_function("inc", |b| {
        let mut setup_rng = rng.clone();
        let mut routine_rng = rng.clone();
        b.iter_batched(
            || Counter::new_counter_with_rng(&mut setup_rng, &pk).unwrap(),
            |mut counter| counter.inc_with_rng(&mut routine_rng, 7).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("add", |b| {
        let mut setup_rng = rng.clone();
        let mut routine_rng = rng.clone();
        b.iter_batched(
            || {
                (
                    Counter::new_counter_with_rng(&mut setup_rng, &pk).unwrap(),
                    Counter::new_counter_with_rng(&mut setup_rng, &pk).unwrap(),
                )
            },
            |(mut a, other)| a.add_with_rng(&mut routine_rng, &other).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("mul", |b| {
        let mut setup_rng = rng.clone();
        let mut routine_rng = rng.clone();
        b.iter_batched(
            || Counter::new_counter_with_rng(&mut setup_rng, &pk).unwrap(),
            |mut counter| counter.mul_with_rng(&mut routine_rng, 9).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("touch (re-randomize)", |b| {
        let mut setup_rng = rng.clone();
        let mut routine_rng = rng.clone();
        b.iter_batched(
            || Counter::new_counter_with_rng(&mut setup_rng, &pk).unwrap(),
            |mut counter| counter.touch_with_rng(&mut routine_rng).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn blinded_comparison(c: &mut criterion::Criterion) {
    let rng = rand_dev::DevRng::new();
    let sk = fixed_keypair();
    let pk = sk.public_key();

    let mut group = c.benchmark_group("Blinded comparison");

    group.bench_function("private_cmp2", |b| {
        let mut setup_rng = rng.clone();
        b.iter_batched(
            || {
                let mut a = Counter::new_counter_with_rng(&mut setup_rng, &pk).unwrap();
                a.inc_with_rng(&mut setup_rng, 100).unwrap();
                let mut other = Counter::new_counter_with_rng(&mut setup_rng, &pk).unwrap();
                other.inc_with_rng(&mut setup_rng, 50).unwrap();
                (a, other)
            },
            |(a, other)| a.private_cmp2(&other, &sk).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("cmp (plaintext decrypt-and-compare)", |b| {
        let mut setup_rng = rng.clone();
        b.iter_batched(
            || {
                let mut a = Counter::new_counter_with_rng(&mut setup_rng, &pk).unwrap();
                a.inc_with_rng(&mut setup_rng, 100).unwrap();
                let mut other = Counter::new_counter_with_rng(&mut setup_rng, &pk).unwrap();
                other.inc_with_rng(&mut setup_rng, 50).unwrap();
                (a, other)
            },
            |(a, other)| a.cmp(&other, Some(&sk), None).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });
}

fn safe_primes(c: &mut criterion::Criterion) {
    let rng = rand_dev::DevRng::new();

    let mut group = c.benchmark_group("Safe primes");
    for (bits, sample_size) in [(512, 100), (1024, 10)] {
        let id = format!("generate_safe_prime/{bits}");
        group.sample_size(sample_size);
        group.bench_function(id, |b| {
            b.iter(|| utils::generate_safe_prime(&mut rng.clone(), bits))
        });
    }
}

fn keypair_generation(c: &mut criterion::Criterion) {
    let rng = rand_dev::DevRng::new();

    let mut group = c.benchmark_group("Keypair generation");
    group.sample_size(10);
    group.bench_function("generate_with_rng/512", |b| {
        let mut rng = rng.clone();
        b.iter(|| PrivateKey::generate_with_rng(&mut rng, 512).unwrap())
    });
}

criterion::criterion_group!(
    benches,
    encryption,
    decryption,
    homomorphic_ops,
    blinded_comparison,
    safe_primes,
    keypair_generation,
);
criterion::criterion_main!(benches);
