use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use hmm_decode::{
    build_emissions, build_initial, build_transitions, DecodingInput, EmissionWeight, HmmModel,
    TransitionWeight, Viterbi,
};
use rand::{rngs::StdRng, Rng, SeedableRng};

const STATES: [&str; 4] = ["n", "e", "s", "w"];
const ACTIONS: [&str; 2] = ["turn", "walk"];
const OBSERVATIONS: [&str; 6] = ["o0", "o1", "o2", "o3", "o4", "o5"];

fn demo_model() -> HmmModel {
    let mut rng = StdRng::seed_from_u64(7);
    let weights: Vec<(String, f64)> = STATES
        .iter()
        .map(|s| (s.to_string(), rng.gen_range(1.0..10.0)))
        .collect();
    let (states, initial) = build_initial(&weights).expect("non-empty weights");

    let mut raw_trans = Vec::new();
    for from in STATES {
        for action in ACTIONS {
            // leave some destinations unlisted so smoothing stays exercised
            for to in STATES.iter().take(2) {
                raw_trans.push(TransitionWeight::new(
                    from,
                    action,
                    *to,
                    rng.gen_range(0.5..5.0),
                ));
            }
        }
    }
    let transitions = build_transitions(&raw_trans, &states, 1.0);

    let mut raw_emit = Vec::new();
    for state in STATES {
        for obs in OBSERVATIONS.iter().take(3) {
            raw_emit.push(EmissionWeight::new(state, *obs, rng.gen_range(0.5..5.0)));
        }
    }
    let emissions = build_emissions(&raw_emit, &states, OBSERVATIONS.len(), 1.0);

    HmmModel {
        states,
        initial,
        transitions,
        emissions,
    }
}

fn random_input(rng: &mut StdRng, len: usize) -> DecodingInput {
    let observations = (0..len)
        .map(|_| OBSERVATIONS[rng.gen_range(0..OBSERVATIONS.len())].to_string())
        .collect();
    let actions = (0..len.saturating_sub(1))
        .map(|_| {
            if rng.gen_bool(0.9) {
                Some(ACTIONS[rng.gen_range(0..ACTIONS.len())].to_string())
            } else {
                None
            }
        })
        .collect();
    DecodingInput::new(observations, actions)
}

fn bench_decode(c: &mut Criterion) {
    let model = demo_model();
    let mut group = c.benchmark_group("viterbi_decode");
    for &len in &[100usize, 1_000, 10_000] {
        group.bench_function(format!("decode_len_{len}"), |b| {
            b.iter_batched(
                || {
                    let mut rng = StdRng::seed_from_u64(44);
                    random_input(&mut rng, len)
                },
                |input| {
                    let path = Viterbi::new(&model).decode(&input);
                    criterion::black_box(path);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

fn bench_build(c: &mut Criterion) {
    c.bench_function("build_model", |b| {
        b.iter(|| criterion::black_box(demo_model()))
    });
}

criterion_group!(benches, bench_decode, bench_build);
criterion_main!(benches);
