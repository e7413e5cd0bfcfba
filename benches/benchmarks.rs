criterion::criterion_main!(benches);
criterion::criterion_group! {
    name = benches;
    config = criterion::Criterion::default()
        .without_plots()
        .noise_threshold(3.0)
        .significance_level(0.01)
        .sample_size(10)
        .measurement_time(std::time::Duration::from_secs(1));
    targets =
        testing_classic_triple,
        finding_first_match_in_deck,
        exhausting_matches_in_deck,
        exhausting_matches_on_board,
        committing_claims_on_board,
}

fn classic() -> Features {
    Features::new(3, 4, 3)
}

fn testing_classic_triple(c: &mut criterion::Criterion) {
    let oracle = classic();
    c.bench_function("test a 3-card group", |b| {
        b.iter(|| oracle.test(&[5, 41, 77]))
    });
}

fn finding_first_match_in_deck(c: &mut criterion::Criterion) {
    let oracle = classic();
    let deck = (0..81).collect::<Vec<Card>>();
    c.bench_function("find the first match in a full deck", |b| {
        b.iter(|| oracle.find(&deck, 1))
    });
}

fn exhausting_matches_in_deck(c: &mut criterion::Criterion) {
    let oracle = classic();
    let deck = (0..81).collect::<Vec<Card>>();
    c.bench_function("find every match in a full deck", |b| {
        b.iter(|| oracle.find(&deck, usize::MAX).len())
    });
}

fn exhausting_matches_on_board(c: &mut criterion::Criterion) {
    let oracle = classic();
    let board = (0..81).step_by(7).collect::<Vec<Card>>();
    c.bench_function("find every match among 12 cards", |b| {
        b.iter(|| oracle.find(&board, usize::MAX).len())
    });
}

fn committing_claims_on_board(c: &mut criterion::Criterion) {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .expect("runtime");
    let config = Config {
        humans: 4,
        robots: 0,
        table_delay_millis: 0,
        ..Config::default()
    };
    let oracle = Arc::new(classic()) as Arc<dyn Oracle>;
    c.bench_function("place, claim and commit a match", |b| {
        b.iter(|| {
            runtime.block_on(async {
                let board = Board::new(&config, Arc::new(Mute), oracle.clone());
                for (slot, card) in [0, 1, 2].into_iter().enumerate() {
                    board.place_card(card, slot).await;
                    board.place_token(0, slot).await;
                    board.place_token(1, slot).await;
                }
                board.commit_match(0).await
            })
        })
    });
}

use roboset::*;
use std::sync::Arc;
