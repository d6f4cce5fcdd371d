use mindful_core::{AmbientSound, CHIME_INTERVAL_OPTIONS, DURATION_PRESETS};
use serde_json::json;

pub fn run(as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        let sounds: Vec<_> = AmbientSound::ALL
            .iter()
            .map(|s| json!({ "id": s.id(), "name": s.display_name() }))
            .collect();
        let out = json!({
            "durations": DURATION_PRESETS,
            "sounds": sounds,
            "chime_intervals_min": CHIME_INTERVAL_OPTIONS,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!("Durations:");
    for preset in DURATION_PRESETS {
        println!("  {:<4} {:>5}s", preset.label, preset.secs);
    }
    println!("Sounds:");
    for sound in AmbientSound::ALL {
        println!("  {:<9} {}", sound.id(), sound.display_name());
    }
    println!("Interval chimes:");
    for min in CHIME_INTERVAL_OPTIONS {
        if min == 0 {
            println!("  off");
        } else {
            println!("  {min}m");
        }
    }
    Ok(())
}
