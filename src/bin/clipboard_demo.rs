// Quick demonstration of editing, clipboard transfer and undo/redo
// Run with: RUST_LOG=debug cargo run --bin clipboard_demo

use tune_composer::host::{FixedViewport, MemoryClipboard, MemorySurface, RecordingSink};
use tune_composer::{EditorConfig, Editor, Instrument};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    println!("🎵 TuneComposer - Clipboard Demo");
    println!("================================");

    let config = EditorConfig::load_or_default();
    let surface = MemorySurface::new();
    let clipboard = MemoryClipboard::new();
    let viewport = FixedViewport::new(0, 0);
    let sink = RecordingSink::new();

    let mut editor = Editor::new(
        config,
        Box::new(surface.clone()),
        Box::new(clipboard.clone()),
        Box::new(viewport.clone()),
        Box::new(sink.clone()),
    );

    // Build a small phrase: two piano notes grouped into a gesture, one violin note
    let first = editor.place_note(0, 600)?;
    let second = editor.place_note(200, 640)?;
    editor.click_select(first, true)?;
    editor.group()?;

    editor.set_instrument(Instrument::Violin);
    let third = editor.place_note(400, 620)?;
    println!("\n✅ Built composition:");
    println!("   - Top-level objects: {}", editor.composition().top_level().len());
    println!("   - Notes: {}", editor.composition().notes().len());
    println!("   - Visuals on surface: {}", surface.visible().len());

    // Copy everything and paste it one screen further right
    editor.select_all()?;
    editor.copy()?;
    println!("\n📋 Clipboard contents:");
    println!("{}", clipboard.contents().unwrap_or_default());

    viewport.scroll_to(600, 0);
    let pasted = editor.paste()?;
    println!("\n📥 Pasted {} objects:", pasted.len());
    for id in &pasted {
        let bounds = editor.composition().get(*id)?.bounds();
        println!("   - {} at x={} y={}", id, bounds.x, bounds.y);
    }

    println!("\n🔘 Command availability:");
    println!("{}", editor.availability().to_json()?);

    // Undo the paste, then redo it
    if let Some(description) = editor.undo()? {
        println!("\n↩️  Undid: {}", description);
    }
    println!("   - Top-level objects: {}", editor.composition().top_level().len());
    if let Some(description) = editor.redo()? {
        println!("↪️  Redid: {}", description);
    }
    println!("   - Top-level objects: {}", editor.composition().top_level().len());

    editor.play();
    println!("\n▶️  Playing {} notes until tick {:?}", sink.events().len(), sink.playhead_end());
    editor.stop();

    println!("\n📸 Snapshot of {}:", third);
    let snapshot = editor.composition().snapshot();
    let entry = snapshot.objects.iter().find(|object| object.id == third);
    println!("{}", serde_json::to_string_pretty(&entry)?);

    // Second note never moved while grouped and copied
    let bounds = editor.composition().get(second)?.bounds();
    println!("\n🎼 Second note still at x={} y={}", bounds.x, bounds.y);

    Ok(())
}
