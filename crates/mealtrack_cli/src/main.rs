//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `mealtrack_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("mealtrack_core ping={}", mealtrack_core::ping());
    println!("mealtrack_core version={}", mealtrack_core::core_version());
}
