use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tui_blockfall::core::{Board, GameSnapshot, GameState};
use tui_blockfall::engine::{Session, SessionConfig};
use tui_blockfall::term::{FrameBuffer, GameView, StatusView, Viewport};
use tui_blockfall::types::{GameAction, GamePhase, PieceKind, TICK_MS};

fn bench_session_tick(c: &mut Criterion) {
    let mut session = Session::new(SessionConfig {
        seed: 12345,
        ..SessionConfig::default()
    })
    .unwrap();
    session.apply(GameAction::Start);

    c.bench_function("session_tick_16ms", |b| {
        b.iter(|| {
            session.advance(black_box(TICK_MS));
            if session.phase() != GamePhase::Running {
                session.apply(GameAction::Start);
            }
            session.take_events();
        })
    });
}

fn bench_step(c: &mut Criterion) {
    let mut state = GameState::new(10, 20, 12345).unwrap();
    state.start();

    c.bench_function("gravity_step", |b| {
        b.iter(|| {
            if state.phase() != GamePhase::Running {
                state.start();
            }
            black_box(state.step());
            state.take_events();
        })
    });
}

fn bench_line_clear(c: &mut Criterion) {
    c.bench_function("clear_4_lines", |b| {
        b.iter(|| {
            let mut board = Board::default();
            // Fill bottom 4 rows
            for y in 16..20 {
                for x in 0..10 {
                    board.set(x, y, Some(PieceKind::I));
                }
            }
            black_box(board.clear_full_rows());
        })
    });
}

fn bench_move(c: &mut Criterion) {
    let mut state = GameState::new(10, 20, 12345).unwrap();
    state.start();

    c.bench_function("move_left_right", |b| {
        b.iter(|| {
            black_box(state.move_left());
            black_box(state.move_right());
        })
    });
}

fn bench_rotate(c: &mut Criterion) {
    let mut state = GameState::new(10, 20, 12345).unwrap();
    state.start();

    c.bench_function("rotate", |b| {
        b.iter(|| {
            black_box(state.rotate());
        })
    });
}

fn bench_snapshot(c: &mut Criterion) {
    let mut state = GameState::new(10, 20, 12345).unwrap();
    state.start();
    let mut snap = GameSnapshot::default();

    c.bench_function("snapshot_into", |b| {
        b.iter(|| {
            state.snapshot_into(black_box(&mut snap));
        })
    });
}

fn bench_render(c: &mut Criterion) {
    let mut state = GameState::new(10, 20, 12345).unwrap();
    state.start();
    let snap = state.snapshot();
    let view = GameView::default();
    let status = StatusView::default();
    let mut fb = FrameBuffer::new(80, 24);

    c.bench_function("render_into_80x24", |b| {
        b.iter(|| {
            view.render_into(black_box(&snap), &status, Viewport::new(80, 24), &mut fb);
        })
    });
}

criterion_group!(
    benches,
    bench_session_tick,
    bench_step,
    bench_line_clear,
    bench_move,
    bench_rotate,
    bench_snapshot,
    bench_render
);
criterion_main!(benches);
