// Property tests for the undo history
// Drives the editor with seeded random command sequences, then walks the
// whole history back and forth checking every intermediate state

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use tune_composer::composition::CompositionSnapshot;
use tune_composer::{Editor, EditorConfig, Instrument, ObjectId, Rect};

const STEPS: usize = 80;

/// Gesture frames cover their children, gesture flags follow their children
fn assert_tree_consistent(snapshot: &CompositionSnapshot) {
    let by_id: HashMap<ObjectId, _> = snapshot.objects.iter().map(|o| (o.id, o)).collect();
    for object in &snapshot.objects {
        if object.children.is_empty() {
            continue;
        }
        let children: Vec<_> = object.children.iter().map(|id| by_id[id]).collect();
        let frame = Rect::union_all(children.iter().map(|child| child.bounds));
        assert_eq!(Some(object.bounds), frame, "frame of {}", object.id);
        assert_eq!(
            object.selected,
            children.iter().all(|child| child.selected),
            "selection flag of {}",
            object.id
        );
        for child in children {
            assert_eq!(child.parent, Some(object.id));
        }
    }
    for root in &snapshot.top_level {
        assert_eq!(by_id[root].parent, None);
    }
}

fn random_top_level(editor: &Editor, rng: &mut StdRng) -> Option<ObjectId> {
    let top = editor.composition().top_level();
    if top.is_empty() {
        None
    } else {
        Some(top[rng.gen_range(0..top.len())])
    }
}

/// Run one random command; errors are allowed but must leave the tree untouched
fn random_step(editor: &mut Editor, rng: &mut StdRng) {
    let before = editor.composition().snapshot();
    let result = match rng.gen_range(0..14) {
        0 | 1 => {
            let x = rng.gen_range(0..90) * 20;
            let y = rng.gen_range(0..120) * 10;
            editor.place_note(x, y).map(|_| ())
        }
        2 => editor.select_all(),
        3 => match random_top_level(editor, rng) {
            Some(id) => editor.click_select(id, rng.gen_bool(0.5)),
            None => Ok(()),
        },
        4 => {
            let dx = rng.gen_range(-3..=3) * 20;
            let dy = rng.gen_range(-3..=3) * 10;
            editor.move_selection(dx, dy).map(|_| ())
        }
        5 => editor.change_selection_length(rng.gen_range(-60..=60)),
        6 => {
            let instrument = Instrument::ALL[rng.gen_range(0..Instrument::ALL.len())];
            editor.change_instrument(instrument)
        }
        7 => editor.group(),
        8 => editor.ungroup(),
        9 => editor.delete(),
        10 => editor.copy(),
        11 => editor.cut(),
        12 => editor.paste().map(|_| ()),
        _ => {
            let x0 = rng.gen_range(0..1800);
            let y0 = rng.gen_range(0..1200);
            let x1 = x0 + rng.gen_range(-200..=200);
            let y1 = y0 + rng.gen_range(-100..=100);
            editor
                .pointer_press(x0, y0, false)
                .and_then(|_| editor.pointer_drag(x1, y1))
                .and_then(|_| editor.pointer_release(x1, y1))
        }
    };
    if result.is_err() {
        assert_eq!(editor.composition().snapshot(), before, "failed command changed the tree");
    }
}

fn run_session(seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut editor = Editor::headless(EditorConfig::default());

    // history[i] is the tree after i recorded entries
    let mut history = vec![editor.composition().snapshot()];
    for _ in 0..STEPS {
        let entries = editor.history().undo_count();
        random_step(&mut editor, &mut rng);
        let snapshot = editor.composition().snapshot();
        assert_tree_consistent(&snapshot);

        let added = editor.history().undo_count() - entries;
        assert!(added <= 1, "one command must make at most one history entry");
        if added == 1 {
            history.push(snapshot);
        } else {
            // Commands that record nothing change nothing
            assert_eq!(history.last(), Some(&snapshot));
        }
    }

    let final_state = editor.composition().snapshot();
    let entries = history.len() - 1;
    assert_eq!(editor.history().undo_count(), entries);

    for step in (0..entries).rev() {
        assert!(editor.undo().unwrap().is_some());
        assert_eq!(editor.composition().snapshot(), history[step], "seed {seed}, undo to {step}");
    }
    assert_eq!(editor.undo().unwrap(), None);

    for step in 1..=entries {
        assert!(editor.redo().unwrap().is_some());
        assert_eq!(editor.composition().snapshot(), history[step], "seed {seed}, redo to {step}");
    }
    assert_eq!(editor.redo().unwrap(), None);
    assert_eq!(editor.composition().snapshot(), final_state);
}

#[test]
fn test_random_sessions_undo_and_redo_fully() {
    for seed in 0..24 {
        run_session(seed);
    }
}

#[test]
fn test_history_limit_drops_oldest_entries() {
    let config = EditorConfig {
        history_limit: 5,
        ..EditorConfig::default()
    };
    let mut editor = Editor::headless(config);
    for i in 0..8 {
        editor.place_note(i * 150, 60).unwrap();
    }
    assert_eq!(editor.history().undo_count(), 5);

    while editor.undo().unwrap().is_some() {}
    // The three oldest notes are out of reach
    assert_eq!(editor.composition().top_level().len(), 3);
}
