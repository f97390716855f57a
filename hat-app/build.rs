// Build-Script: Wird vor dem Kompilieren ausgeführt
// Reicht optionale Device-Pfade aus .env an den Compiler weiter

const DEVICE_VARS: [&str; 3] = [
    "RAINBOW_LEDS_DEV",
    "RAINBOW_BUTTONS_DEV",
    "RAINBOW_BUZZER_DEV",
];

fn main() {
    // Lade .env file für Device-Pfade
    // Fehlt sie, gelten die Standard-Pfade aus config.rs
    if let Err(e) = dotenvy::dotenv() {
        eprintln!(".env file nicht geladen ({e}), nutze Standard-Device-Pfade");
    }

    // Gebe Device-Pfade an Rust-Compiler weiter
    // Die Werte werden zur Compile-Zeit in den Code eingebacken
    for var in DEVICE_VARS {
        println!("cargo:rerun-if-env-changed={var}");
        if let Ok(path) = std::env::var(var) {
            println!("cargo:rustc-env={var}={path}");
        }
    }
}
