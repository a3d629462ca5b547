use base64::Engine;
use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use rand::{rngs::StdRng, Rng, SeedableRng};

use gatehouse::identity::{can, Capability, Credential, Identity, Role};

fn token_for(sub: &str, role: &str) -> Credential {
    let engine = &base64::engine::general_purpose::URL_SAFE_NO_PAD;
    let header = engine.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = engine.encode(
        serde_json::to_vec(&serde_json::json!({"sub": sub, "role": role, "exp": 4102444800i64}))
            .unwrap(),
    );
    Credential::new(format!("{header}.{payload}.sig"))
}

fn bench_identity_decode(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xBEEF_CAFE);
    let creds: Vec<Credential> = (0..1024)
        .map(|i| {
            let role = Role::ALL[rng.gen_range(0..Role::ALL.len())];
            token_for(&format!("user{i}"), role.as_str())
        })
        .collect();

    let mut group = c.benchmark_group("identity");
    group.throughput(Throughput::Elements(creds.len() as u64));
    group.bench_function("decode", |b| {
        b.iter(|| {
            let mut derived = 0usize;
            for cred in &creds {
                if Identity::from_credential(cred).is_some() {
                    derived += 1;
                }
            }
            criterion::black_box(derived);
        });
    });
    group.finish();
}

fn bench_capability_gate(c: &mut Criterion) {
    let mut group = c.benchmark_group("authorizer");
    group.throughput(Throughput::Elements((Role::ALL.len() * Capability::ALL.len()) as u64));
    group.bench_function("gate", |b| {
        b.iter(|| {
            let mut allowed = 0u32;
            for role in Role::ALL {
                for capability in Capability::ALL {
                    if can(role, capability) {
                        allowed += 1;
                    }
                }
            }
            criterion::black_box(allowed);
        });
    });
    group.finish();
}

criterion_group!(benches, bench_identity_decode, bench_capability_gate);
criterion_main!(benches);
