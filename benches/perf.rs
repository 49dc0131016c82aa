use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use rand::SeedableRng;
use rand::rngs::StdRng;

use flexbot::riot_fetch::{parse_match_detail_json, parse_match_ids_json};
use flexbot::store::{self, ALL_ROLES};
use flexbot::team_gen::{Session, generate_team};

fn bench_match_detail_parse(c: &mut Criterion) {
    c.bench_function("match_detail_parse", |b| {
        b.iter(|| {
            let detail = parse_match_detail_json(black_box(MATCH_DETAIL_JSON)).unwrap();
            black_box(detail.participants.len());
        })
    });
}

fn bench_match_ids_parse(c: &mut Criterion) {
    c.bench_function("match_ids_parse", |b| {
        b.iter(|| {
            let ids = parse_match_ids_json(black_box(MATCH_IDS_JSON)).unwrap();
            black_box(ids.len());
        })
    });
}

fn bench_role_breakdown(c: &mut Criterion) {
    let conn = store::open_in_memory().expect("schema");
    store::insert_player(&conn, "UmbreonReaper", "umbreonreaper", "euw").expect("player");
    let player_id = store::find_player(&conn, "UmbreonReaper")
        .expect("query")
        .expect("player row")
        .id;
    for n in 0..500usize {
        let role = ALL_ROLES[n % ALL_ROLES.len()];
        store::record_participation(&conn, player_id, &format!("EUW1_{n:07}"), role, n % 3 == 0)
            .expect("participation row");
    }

    c.bench_function("role_breakdown", |b| {
        b.iter(|| {
            let lines = store::role_breakdown(black_box(&conn), black_box(player_id)).unwrap();
            black_box(lines.len());
        })
    });
}

fn bench_team_generate(c: &mut Criterion) {
    let players: Vec<String> = ["Ana", "Ben", "Cass", "Dio", "Eve"]
        .into_iter()
        .map(String::from)
        .collect();
    let mut base = Session::new();
    let mut warm_rng = StdRng::seed_from_u64(11);
    for _ in 0..8 {
        generate_team(&mut base, &players, &mut warm_rng).expect("warmup draw");
    }

    c.bench_function("team_generate", |b| {
        b.iter(|| {
            let mut session = base.clone();
            let mut rng = StdRng::seed_from_u64(42);
            let team = generate_team(black_box(&mut session), black_box(&players), &mut rng).unwrap();
            black_box(team.len());
        })
    });
}

criterion_group!(
    perf,
    bench_match_detail_parse,
    bench_match_ids_parse,
    bench_role_breakdown,
    bench_team_generate
);
criterion_main!(perf);

static MATCH_DETAIL_JSON: &str = include_str!("../tests/fixtures/match_detail.json");
static MATCH_IDS_JSON: &str = include_str!("../tests/fixtures/match_ids.json");
