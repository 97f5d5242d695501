use std::collections::BTreeMap;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use mlbb_terminal::directory::{HeroDirectory, HeroId, parse_hero_list_json};
use mlbb_terminal::hero_detail::parse_hero_detail_json;
use mlbb_terminal::normalize::normalize;
use mlbb_terminal::rank_board::parse_rank_board_json;
use mlbb_terminal::roster::parse_position_page_json;

fn synthetic_names(count: usize) -> BTreeMap<HeroId, String> {
    (0..count)
        .map(|idx| (HeroId((idx + 1).to_string()), format!("Hero-{idx} Sun'shin")))
        .collect()
}

fn position_page(count: usize) -> String {
    let records: Vec<String> = (0..count)
        .map(|idx| {
            format!(
                r#"{{"data":{{"hero":{{"data":{{"name":"Hero {idx}","smallmap":"https://img/{idx}.png"}}}}}}}}"#
            )
        })
        .collect();
    format!(r#"{{"data":{{"records":[{}]}}}}"#, records.join(","))
}

fn bench_normalize(c: &mut Criterion) {
    let names = ["Yi Sun-shin", "X.Borg", "Chang'e", "  Lúnox  ", "Popol and Kupa"];
    c.bench_function("normalize_names", |b| {
        b.iter(|| {
            for name in names {
                black_box(normalize(black_box(name)));
            }
        })
    });
}

fn bench_directory_index(c: &mut Criterion) {
    let names = synthetic_names(130);
    c.bench_function("directory_index_build", |b| {
        b.iter(|| {
            let directory = HeroDirectory::from_names(black_box(names.clone()));
            black_box(directory.len());
        })
    });

    let directory = HeroDirectory::from_names(names);
    c.bench_function("directory_lookup", |b| {
        b.iter(|| black_box(directory.lookup(black_box("hero-64 sun'shin"))))
    });
}

fn bench_hero_list_parse(c: &mut Criterion) {
    c.bench_function("hero_list_parse", |b| {
        b.iter(|| {
            let names = parse_hero_list_json(black_box(HERO_LIST_JSON)).unwrap();
            black_box(names.len());
        })
    });
}

fn bench_rank_board_parse(c: &mut Criterion) {
    c.bench_function("rank_board_parse", |b| {
        b.iter(|| {
            let board = parse_rank_board_json(black_box(HERO_RANK_JSON)).unwrap();
            black_box(board.len());
        })
    });
}

fn bench_position_page_parse(c: &mut Criterion) {
    let raw = position_page(50);
    c.bench_function("position_page_parse", |b| {
        b.iter(|| {
            let page = parse_position_page_json(black_box(&raw)).unwrap();
            black_box(page.records);
        })
    });
}

fn bench_hero_detail_parse(c: &mut Criterion) {
    c.bench_function("hero_detail_parse", |b| {
        b.iter(|| {
            let detail =
                parse_hero_detail_json(HeroId("1".to_string()), black_box(HERO_DETAIL_JSON))
                    .unwrap();
            black_box(detail.map(|d| d.skills.len()));
        })
    });
}

criterion_group!(
    perf,
    bench_normalize,
    bench_directory_index,
    bench_hero_list_parse,
    bench_rank_board_parse,
    bench_position_page_parse,
    bench_hero_detail_parse
);
criterion_main!(perf);

static HERO_LIST_JSON: &str = include_str!("../tests/fixtures/hero_list.json");
static HERO_RANK_JSON: &str = include_str!("../tests/fixtures/hero_rank.json");
static HERO_DETAIL_JSON: &str = include_str!("../tests/fixtures/hero_detail_miya.json");
