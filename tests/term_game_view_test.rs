use tui_blockfall::core::{template, ActiveSnapshot, GameSnapshot};
use tui_blockfall::term::{AdapterStatusView, GameView, StatusView, Viewport};
use tui_blockfall::types::{GamePhase, PieceKind};

// 10x20 board in an 80x24 terminal: the 22x22 frame starts at (29, 1).
const ORIGIN_X: u16 = 29;
const ORIGIN_Y: u16 = 1;

fn running_snapshot() -> GameSnapshot {
    GameSnapshot {
        phase: GamePhase::Running,
        episode_id: 1,
        ..GameSnapshot::default()
    }
}

fn ch_at(fb: &tui_blockfall::term::FrameBuffer, x: u16, y: u16) -> char {
    fb.get(x, y).unwrap().ch
}

#[test]
fn test_border_corners() {
    let fb = GameView::default().render(&running_snapshot(), &StatusView::default(), Viewport::new(80, 24));
    assert_eq!(ch_at(&fb, ORIGIN_X, ORIGIN_Y), '┌');
    assert_eq!(ch_at(&fb, ORIGIN_X + 21, ORIGIN_Y), '┐');
    assert_eq!(ch_at(&fb, ORIGIN_X, ORIGIN_Y + 21), '└');
    assert_eq!(ch_at(&fb, ORIGIN_X + 21, ORIGIN_Y + 21), '┘');
    assert_eq!(ch_at(&fb, ORIGIN_X + 1, ORIGIN_Y), '─');
    assert_eq!(ch_at(&fb, ORIGIN_X, ORIGIN_Y + 1), '│');
}

#[test]
fn test_locked_cell_drawn_as_brackets() {
    let mut snap = running_snapshot();
    snap.board[19 * 10] = PieceKind::Z.color_id();

    let fb = GameView::default().render(&snap, &StatusView::default(), Viewport::new(80, 24));
    let py = ORIGIN_Y + 1 + 19;
    assert_eq!(ch_at(&fb, ORIGIN_X + 1, py), '[');
    assert_eq!(ch_at(&fb, ORIGIN_X + 2, py), ']');
    assert_eq!(ch_at(&fb, ORIGIN_X + 3, py), ' ');
}

#[test]
fn test_single_column_cells() {
    let mut snap = running_snapshot();
    snap.board[0] = 1;
    let fb = GameView::new(1).render(&snap, &StatusView::default(), Viewport::new(40, 24));
    // 12x22 frame in 40x24 starts at (14, 1).
    assert_eq!(ch_at(&fb, 15, 2), '■');
}

#[test]
fn test_active_piece_clipped_above_board() {
    let mut snap = running_snapshot();
    snap.active = Some(ActiveSnapshot {
        kind: PieceKind::I,
        color: PieceKind::I.color_id(),
        x: 0,
        y: -2,
        shape: template(PieceKind::I).rotated(),
    });

    let fb = GameView::default().render(&snap, &StatusView::default(), Viewport::new(80, 24));
    // Rows -2 and -1 are not drawn; the top border stays intact.
    assert_eq!(ch_at(&fb, ORIGIN_X + 1, ORIGIN_Y), '─');
    assert_eq!(ch_at(&fb, ORIGIN_X + 1, ORIGIN_Y + 1), '[');
    assert_eq!(ch_at(&fb, ORIGIN_X + 1, ORIGIN_Y + 2), '[');
    assert_eq!(ch_at(&fb, ORIGIN_X + 1, ORIGIN_Y + 3), ' ');
}

#[test]
fn test_phase_overlays() {
    let view = GameView::default();
    let status = StatusView::default();
    let overlay_row = ORIGIN_Y + 11;

    let idle = view.render(&GameSnapshot::default(), &status, Viewport::new(80, 24));
    assert!(idle.row_text(overlay_row).contains("PRESS ENTER"));

    let mut snap = running_snapshot();
    let running = view.render(&snap, &status, Viewport::new(80, 24));
    for y in 0..24 {
        let row = running.row_text(y);
        assert!(!row.contains("PAUSED") && !row.contains("GAME OVER"));
    }

    snap.phase = GamePhase::Paused;
    let paused = view.render(&snap, &status, Viewport::new(80, 24));
    assert!(paused.row_text(overlay_row).contains("PAUSED"));

    snap.phase = GamePhase::GameOver;
    let over = view.render(&snap, &status, Viewport::new(80, 24));
    assert!(over.row_text(overlay_row).contains("GAME OVER"));
}

#[test]
fn test_side_panel_shows_score_and_adapter() {
    let mut snap = running_snapshot();
    snap.score = 120;
    let status = StatusView {
        adapter: Some(AdapterStatusView {
            client_count: 2,
            controller_id: Some(3),
        }),
        last_score: Some(40),
    };

    let fb = GameView::default().render(&snap, &status, Viewport::new(80, 24));
    let text: Vec<String> = (0..24).map(|y| fb.row_text(y)).collect();
    assert!(text[1].contains("SCORE"));
    assert!(text[2].contains("120"));
    assert!(text.iter().any(|r| r.contains("running")));
    assert!(text.iter().any(|r| r.contains("LAST")));
    assert!(text.iter().any(|r| r.contains("clients 2")));
    assert!(text.iter().any(|r| r.contains("ctrl 3")));
}

#[test]
fn test_tiny_viewport_does_not_panic() {
    let view = GameView::default();
    let snap = running_snapshot();
    for (w, h) in [(0, 0), (1, 1), (5, 3), (30, 10)] {
        let fb = view.render(&snap, &StatusView::default(), Viewport::new(w, h));
        assert_eq!((fb.width(), fb.height()), (w, h));
    }
}
